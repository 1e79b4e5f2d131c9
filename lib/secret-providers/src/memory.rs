use crate::secrets_table;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use vault_client::{Logger, Secret, Vault, VaultError, default_logger};

/// Secrets given directly in the configuration.
///
/// ```json
/// { "secrets": { "db/main": { "username": "app", "password": "..." } } }
/// ```
pub struct MemoryVault {
    secrets: HashMap<String, Arc<Secret>>,
    logger: Arc<dyn Logger>,
}

impl MemoryVault {
    pub fn from_config(config: &Value) -> Result<Self, VaultError> {
        Self::with_logger(config, default_logger())
    }

    pub fn with_logger(config: &Value, logger: Arc<dyn Logger>) -> Result<Self, VaultError> {
        if config.is_null() {
            return Err(VaultError::configuration("Configuration must be set"));
        }
        Ok(Self {
            secrets: secrets_table(config)?,
            logger,
        })
    }

    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.secrets.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

#[async_trait]
impl Vault for MemoryVault {
    async fn get_secret(&self, path: &str) -> Result<Arc<Secret>, VaultError> {
        match self.secrets.get(path) {
            Some(secret) => Ok(secret.clone()),
            None => {
                self.logger
                    .debug(&format!("[MemoryVault] Secret not available: {path}"), None);
                Err(VaultError::not_found(path))
            }
        }
    }

    fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = logger;
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
