// lib/secret-providers/src/lib.rs
pub mod file;
pub mod memory;
pub mod provider;
pub mod registry;

pub use file::FileVault;
pub use memory::MemoryVault;
pub use provider::{CredentialsProvider, SecretProvider};
pub use registry::{VaultConstructor, VaultRegistry};

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use vault_client::{Secret, VaultError};

/// Secrets listed under `"secrets"` as `{ path: { key: value } }`.
pub(crate) fn secrets_table(document: &Value) -> Result<HashMap<String, Arc<Secret>>, VaultError> {
    let Some(secrets) = document.get("secrets") else {
        return Ok(HashMap::new());
    };
    let secrets = secrets
        .as_object()
        .ok_or_else(|| VaultError::configuration("\"secrets\" must be an object"))?;

    secrets
        .iter()
        .map(|(path, data)| match data {
            Value::Object(map) => Ok((path.clone(), Arc::new(Secret::from_data(map.clone())))),
            Value::Null => Ok((path.clone(), Arc::new(Secret::from_data(Map::new())))),
            _ => Err(VaultError::configuration(format!(
                "secret {path} must be an object"
            ))),
        })
        .collect()
}
