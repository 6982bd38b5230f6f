//! Offline database update.
//!
//! Brings the signature database up to date with the releases published
//! upstream and rebuilds the candidate database from it. Downloading and
//! unpacking release archives happens outside the scanner: every release
//! is expected as an extracted tree at `<releases_dir>/<Family>/<version>/`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::candidates::{build_candidates, save_candidates, CandidateDatabase};
use crate::config::UpdateConfig;
use crate::releases::{ReleaseMetadataProvider, ReleaseRegistry};
use crate::signature::{
    extract_signatures, load_signatures, save_signatures, InclusionPolicy, SignatureDatabase,
};

/// What one update run changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    /// `(family, version)` pairs ingested in this run
    pub ingested: Vec<(String, String)>,
    /// Families whose latest releases were all known already
    pub up_to_date: Vec<String>,
    /// Releases without an extracted tree on disk
    pub missing_trees: usize,
}

/// Runs the update pipeline for every family with a built-in policy.
///
/// A family whose provider fails is logged and skipped; the remaining
/// families are still updated and both databases are written.
///
/// # Errors
///
/// Returns an error if a database cannot be loaded or saved.
pub async fn update_database(
    config: &UpdateConfig,
    releases: &ReleaseRegistry,
) -> Result<UpdateSummary> {
    let mut database = load_signatures(&config.signatures_path)
        .await
        .with_context(|| format!("Failed to load {}", config.signatures_path.display()))?;
    let mut summary = UpdateSummary::default();

    for &family in InclusionPolicy::builtin_families() {
        let Some(provider) = releases.get(family) else {
            log::warn!("No release metadata provider for {}, skipping", family);
            continue;
        };
        if let Err(e) =
            update_family(&mut database, provider, &config.releases_dir, &mut summary).await
        {
            log::warn!("Could not update {}: {:#}", family, e);
        }
    }

    save_signatures(&database, &config.signatures_path)
        .await
        .with_context(|| format!("Failed to save {}", config.signatures_path.display()))?;

    let candidates = build_candidate_database(&database, config.identifier_limit);
    save_candidates(&candidates, &config.candidates_path)
        .await
        .with_context(|| format!("Failed to save {}", config.candidates_path.display()))?;

    log::info!(
        "Update finished: {} releases ingested, {} families up to date, {} trees missing",
        summary.ingested.len(),
        summary.up_to_date.len(),
        summary.missing_trees
    );
    Ok(summary)
}

async fn update_family(
    database: &mut SignatureDatabase,
    provider: &dyn ReleaseMetadataProvider,
    releases_dir: &Path,
    summary: &mut UpdateSummary,
) -> Result<()> {
    let family = provider.family();
    let policy = InclusionPolicy::for_family(family)
        .with_context(|| format!("No inclusion policy for {}", family))?;

    let branches = provider.latest_branches().await?;
    let signatures = database.family_mut(family);
    if branches
        .iter()
        .all(|b| signatures.has_version(&b.latest_version))
    {
        log::info!("{} signatures are up to date", family);
        summary.up_to_date.push(family.to_string());
        return Ok(());
    }

    let packages = provider.downloadable_packages().await?;
    for version in packages.keys() {
        if signatures.has_version(version) {
            continue;
        }

        let tree = releases_dir.join(family).join(version);
        if !tree.is_dir() {
            log::info!(
                "No extracted tree for {} {} at {}, skipping",
                family,
                version,
                tree.display()
            );
            summary.missing_trees += 1;
            continue;
        }

        let task_policy = policy.clone();
        let extracted = tokio::task::spawn_blocking(move || extract_signatures(&tree, &task_policy))
            .await
            .context("Signature extraction task failed")?;

        match extracted {
            Ok(files) => {
                signatures.ingest(version, &files);
                log::info!("Ingested {} files of {} {}", files.len(), family, version);
                summary
                    .ingested
                    .push((family.to_string(), version.clone()));
            }
            Err(e) => log::warn!("Could not extract {} {}: {}", family, version, e),
        }
    }
    Ok(())
}

/// Builds the candidate database for every family with ingested signatures.
pub fn build_candidate_database(database: &SignatureDatabase, limit: usize) -> CandidateDatabase {
    let mut candidates = CandidateDatabase::default();

    for (name, family) in &database.families {
        match build_candidates(family, limit) {
            Ok(built) => {
                log::info!(
                    "{}: {} identifier files, best score {:.3}, {} versions without proof",
                    name,
                    built.identifier.len(),
                    built.identifier.first().map_or(0.0, |c| c.score),
                    built.proofless_count()
                );
                candidates.families.insert(name.clone(), built);
            }
            Err(e) => log::warn!("Skipping candidates for {}: {}", name, e),
        }
    }
    candidates
}

/// Rebuilds the candidate database from the stored signature database only.
///
/// # Errors
///
/// Returns an error if the signature database is missing, empty or cannot be
/// read, or if the candidate file cannot be written.
pub async fn rebuild_candidates(
    signatures_path: &Path,
    candidates_path: &Path,
    limit: usize,
) -> Result<CandidateDatabase> {
    if !signatures_path.exists() {
        anyhow::bail!("No signature database at {}", signatures_path.display());
    }
    let database = load_signatures(signatures_path)
        .await
        .with_context(|| format!("Failed to load {}", signatures_path.display()))?;

    let candidates = build_candidate_database(&database, limit);
    if candidates.families.is_empty() {
        anyhow::bail!("Signature database {} holds no usable family", signatures_path.display());
    }

    save_candidates(&candidates, candidates_path)
        .await
        .with_context(|| format!("Failed to save {}", candidates_path.display()))?;
    Ok(candidates)
}
