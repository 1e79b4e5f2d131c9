use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use vault_client::{Secret, Vault, VaultError};

enum Loaded {
    Pending,
    Ready(Arc<Secret>),
    Failed,
}

/// One secret of a vault, fetched on first use.
///
/// The first failure is returned as is; afterwards the provider answers
/// `SecretNotFound` without asking the vault again.
pub struct SecretProvider {
    vault: Arc<dyn Vault>,
    path: String,
    loaded: Mutex<Loaded>,
}

impl SecretProvider {
    pub fn new(vault: Arc<dyn Vault>, path: impl Into<String>) -> Result<Self, VaultError> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(VaultError::configuration("Path cannot be empty"));
        }
        Ok(Self {
            vault,
            path,
            loaded: Mutex::new(Loaded::Pending),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn secret(&self) -> Result<Arc<Secret>, VaultError> {
        let mut loaded = self.loaded.lock().await;
        match &*loaded {
            Loaded::Ready(secret) => Ok(secret.clone()),
            Loaded::Failed => Err(VaultError::not_found(&self.path)),
            Loaded::Pending => match self.vault.get_secret(&self.path).await {
                Ok(secret) => {
                    *loaded = Loaded::Ready(secret.clone());
                    Ok(secret)
                }
                Err(e) => {
                    tracing::debug!(path = %self.path, error = %e, "Secret unavailable");
                    *loaded = Loaded::Failed;
                    Err(e)
                }
            },
        }
    }

    /// Value under `key`, `None` when the secret has no such key.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, VaultError> {
        Ok(self.secret().await?.get(key).cloned())
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>, VaultError> {
        Ok(self.secret().await?.get_string(key))
    }
}

/// Username and password kept in one secret.
pub struct CredentialsProvider {
    inner: SecretProvider,
    username_key: String,
    password_key: String,
}

fn key_or(key: Option<&str>, default: &str) -> String {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() => k.to_string(),
        _ => default.to_string(),
    }
}

impl CredentialsProvider {
    /// Keys default to `username` and `password` when `None` or blank.
    pub fn new(
        vault: Arc<dyn Vault>,
        path: impl Into<String>,
        username_key: Option<&str>,
        password_key: Option<&str>,
    ) -> Result<Self, VaultError> {
        Ok(Self {
            inner: SecretProvider::new(vault, path)?,
            username_key: key_or(username_key, "username"),
            password_key: key_or(password_key, "password"),
        })
    }

    pub fn path(&self) -> &str {
        self.inner.path()
    }

    pub async fn username(&self) -> Result<Option<String>, VaultError> {
        self.inner.get_string(&self.username_key).await
    }

    pub async fn password(&self) -> Result<Option<String>, VaultError> {
        self.inner.get_string(&self.password_key).await
    }
}
