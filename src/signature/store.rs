//! Signature database persistence.

use std::path::Path;

use tokio::fs;

use crate::error_handling::SignatureError;
use crate::signature::database::SignatureDatabase;

/// Loads the signature database, starting empty when the file does not exist yet.
pub async fn load_signatures(path: &Path) -> Result<SignatureDatabase, SignatureError> {
    if !path.exists() {
        log::info!(
            "No signature database at {}, starting from an empty one",
            path.display()
        );
        return Ok(SignatureDatabase::new());
    }

    let content = fs::read_to_string(path).await?;
    let database: SignatureDatabase = serde_json::from_str(&content)?;
    log::debug!(
        "Loaded signatures for {} families from {}",
        database.families.len(),
        path.display()
    );
    Ok(database)
}

/// Saves the signature database as pretty-printed JSON, creating parent directories.
pub async fn save_signatures(
    database: &SignatureDatabase,
    path: &Path,
) -> Result<(), SignatureError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(database)?;
    fs::write(path, json).await?;
    Ok(())
}
