//! Candidate database loading and saving.

use std::path::Path;

use tokio::fs;

use crate::candidates::models::CandidateDatabase;
use crate::error_handling::CandidateDatabaseError;

/// Loads and validates the candidate database.
///
/// A scan cannot start without it, so every failure is a configuration error.
///
/// # Errors
///
/// - `NotFound` if the file does not exist
/// - `Io` if it cannot be read
/// - `Parse` if it is not candidate JSON
/// - `Empty` if it holds no family
/// - `EmptyIdentifiers` if a family has nothing to probe
pub async fn load_candidates(path: &Path) -> Result<CandidateDatabase, CandidateDatabaseError> {
    if !path.exists() {
        return Err(CandidateDatabaseError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| CandidateDatabaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let database: CandidateDatabase = serde_json::from_str(&content)?;
    validate(&database)?;

    log::debug!(
        "Loaded candidates for {} families from {}",
        database.families.len(),
        path.display()
    );
    Ok(database)
}

fn validate(database: &CandidateDatabase) -> Result<(), CandidateDatabaseError> {
    if database.families.is_empty() {
        return Err(CandidateDatabaseError::Empty);
    }
    if let Some((name, _)) = database
        .families
        .iter()
        .find(|(_, family)| family.identifier.is_empty())
    {
        return Err(CandidateDatabaseError::EmptyIdentifiers(name.clone()));
    }
    Ok(())
}

/// Saves the candidate database as JSON, creating parent directories.
pub async fn save_candidates(
    database: &CandidateDatabase,
    path: &Path,
) -> Result<(), CandidateDatabaseError> {
    let io_error = |source| CandidateDatabaseError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    let json = serde_json::to_string_pretty(database)?;
    fs::write(path, json).await.map_err(io_error)?;
    Ok(())
}
