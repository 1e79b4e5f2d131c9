use crate::{FileVault, MemoryVault};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use vault_client::{HashicorpVault, Logger, Vault, VaultError};

pub type VaultConstructor = fn(&Value, Arc<dyn Logger>) -> Result<Box<dyn Vault>, VaultError>;

/// Builds vault backends by tag.
///
/// Tags are matched trimmed and lower-cased. Register extra backends at
/// process start, before the registry is shared.
#[derive(Clone, Default)]
pub struct VaultRegistry {
    constructors: HashMap<String, VaultConstructor>,
}

fn normalize(tag: &str) -> String {
    tag.trim().to_ascii_lowercase()
}

fn memory(config: &Value, logger: Arc<dyn Logger>) -> Result<Box<dyn Vault>, VaultError> {
    Ok(Box::new(MemoryVault::with_logger(config, logger)?))
}

fn file(config: &Value, logger: Arc<dyn Logger>) -> Result<Box<dyn Vault>, VaultError> {
    Ok(Box::new(FileVault::with_logger(config, logger)?))
}

fn hashicorp(config: &Value, logger: Arc<dyn Logger>) -> Result<Box<dyn Vault>, VaultError> {
    Ok(Box::new(HashicorpVault::from_value(config, logger)?))
}

impl VaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry knowing `memory`, `file` and `hashicorp`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("memory", memory);
        registry.register("file", file);
        registry.register("hashicorp", hashicorp);
        registry
    }

    pub fn register(&mut self, tag: &str, constructor: VaultConstructor) -> &mut Self {
        self.constructors.insert(normalize(tag), constructor);
        self
    }

    pub fn backends(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Build from `{ "type": <tag>, "config": <backend config> }`.
    pub fn create(&self, config: &Value, logger: Arc<dyn Logger>) -> Result<Box<dyn Vault>, VaultError> {
        if config.is_null() {
            return Err(VaultError::configuration("Vault configuration cannot be empty"));
        }
        if !config.is_object() {
            return Err(VaultError::configuration(
                "Vault configuration must be an object",
            ));
        }
        let tag = config.get("type").and_then(Value::as_str).unwrap_or_default();
        let backend_config = config.get("config").unwrap_or(&Value::Null);
        self.create_vault(tag, backend_config, logger)
    }

    pub fn create_vault(
        &self,
        tag: &str,
        config: &Value,
        logger: Arc<dyn Logger>,
    ) -> Result<Box<dyn Vault>, VaultError> {
        let tag = normalize(tag);
        if tag.is_empty() {
            return Err(VaultError::configuration("Vault type cannot be empty"));
        }
        let constructor = self
            .constructors
            .get(&tag)
            .ok_or_else(|| VaultError::UnknownBackend(tag.clone()))?;
        tracing::debug!(backend = %tag, "Creating vault");
        constructor(config, logger)
    }
}
