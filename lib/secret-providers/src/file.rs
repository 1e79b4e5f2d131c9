use crate::secrets_table;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::read_to_string;
use tokio::sync::OnceCell;
use vault_client::{Logger, Secret, Vault, VaultError, default_logger};

/// Secrets read from a JSON file on first use.
///
/// The file holds `{ "secrets": { path: { key: value } } }`. Comments and
/// trailing commas are accepted.
pub struct FileVault {
    path: PathBuf,
    secrets: OnceCell<HashMap<String, Arc<Secret>>>,
    logger: Arc<dyn Logger>,
}

impl FileVault {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            secrets: OnceCell::new(),
            logger: default_logger(),
        }
    }

    pub fn from_config(config: &Value) -> Result<Self, VaultError> {
        Self::with_logger(config, default_logger())
    }

    pub fn with_logger(config: &Value, logger: Arc<dyn Logger>) -> Result<Self, VaultError> {
        if config.is_null() {
            return Err(VaultError::configuration("Configuration must be set"));
        }
        let filename = config
            .get("filename")
            .and_then(Value::as_str)
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| VaultError::configuration("Configuration must contain filename"))?;

        let mut vault = Self::new(filename);
        vault.logger = logger;
        Ok(vault)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, Arc<Secret>>, VaultError> {
        self.logger.debug(
            &format!("[FileVault] Loading secrets from {}", self.path.display()),
            None,
        );
        let contents = read_to_string(&self.path)
            .await
            .map_err(|source| VaultError::SecretsFile {
                path: self.path.clone(),
                source,
            })?;
        let document: Value = json5::from_str(&contents).map_err(|e| {
            VaultError::configuration(format!(
                "invalid secrets file {}: {e}",
                self.path.display()
            ))
        })?;
        secrets_table(&document)
    }
}

#[async_trait]
impl Vault for FileVault {
    async fn get_secret(&self, path: &str) -> Result<Arc<Secret>, VaultError> {
        let secrets = self.secrets.get_or_try_init(|| self.load()).await?;
        secrets
            .get(path)
            .cloned()
            .ok_or_else(|| VaultError::not_found(path))
    }

    fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = logger;
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn secrets_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_secret_from_file() {
        let file = secrets_file(r#"{"secrets": {"db/main": {"username": "app", "port": 5432}}}"#);
        let vault =
            FileVault::from_config(&json!({"filename": file.path().to_str().unwrap()})).unwrap();

        let secret = vault.get_secret("db/main").await.unwrap();
        assert_eq!(secret.get_string("username").as_deref(), Some("app"));
        assert_eq!(secret.get("port"), Some(&json!(5432)));
    }

    #[tokio::test]
    async fn test_file_read_lazily_once() {
        let file = secrets_file(r#"{"secrets": {"a": {"k": "v1"}}}"#);
        let vault = FileVault::new(file.path());

        vault.get_secret("a").await.unwrap();
        std::fs::write(file.path(), r#"{"secrets": {"a": {"k": "v2"}}}"#).unwrap();
        let secret = vault.get_secret("a").await.unwrap();

        assert_eq!(secret.get_string("k").as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_accepts_comments() {
        let file = secrets_file(
            r#"{
                // local development only
                "secrets": {"a": {"k": "v",},},
            }"#,
        );
        let vault = FileVault::new(file.path());
        assert!(vault.get_secret("a").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let vault = FileVault::new("/nonexistent/secrets.json");
        let err = vault.get_secret("a").await.unwrap_err();
        assert!(matches!(err, VaultError::SecretsFile { .. }));
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let file = secrets_file(r#"{"secrets": {}}"#);
        let vault = FileVault::new(file.path());
        assert!(vault.get_secret("a").await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_config_requires_filename() {
        assert!(matches!(
            FileVault::from_config(&json!({})),
            Err(VaultError::Configuration(_))
        ));
        assert!(matches!(
            FileVault::from_config(&Value::Null),
            Err(VaultError::Configuration(_))
        ));
    }
}
