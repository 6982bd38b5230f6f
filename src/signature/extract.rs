//! Signature extraction from an extracted release tree.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use md5::{Digest, Md5};
use walkdir::{DirEntry, WalkDir};

use crate::error_handling::SignatureError;
use crate::signature::policy::{InclusionPolicy, VCS_DIRECTORIES};

/// Hashes file content the way signatures are stored: lowercase hex MD5.
///
/// The same function hashes files on disk at build time and response bodies
/// at scan time, so both sides of a comparison always agree.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

fn is_hidden_or_vcs(entry: &DirEntry) -> bool {
    // depth 0 is the web root itself, which may legitimately be named anything
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && VCS_DIRECTORIES.contains(&name.as_ref()))
}

/// Joins the components of a relative path with `/`.
fn to_key(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Computes a content hash for every tracked file of a release tree.
///
/// `base` is the directory the release archive was extracted into; the
/// policy's web root is resolved below it. Keys are root-relative paths
/// joined with `/`, without a leading slash.
///
/// # Errors
///
/// Returns `SignatureError::InvalidBasePath` if the web root does not exist,
/// and walk or read errors for files that cannot be accessed.
pub fn extract_signatures(
    base: &Path,
    policy: &InclusionPolicy,
) -> Result<BTreeMap<String, String>, SignatureError> {
    let webroot = base.join(policy.webroot.trim_start_matches('/'));
    if !webroot.is_dir() {
        return Err(SignatureError::InvalidBasePath(webroot));
    }

    let compiled = policy.compile()?;
    let mut signatures = BTreeMap::new();

    let walker = WalkDir::new(&webroot)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden_or_vcs(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.io_error().map(|io| io.kind()) == Some(std::io::ErrorKind::PermissionDenied) => {
                log::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(&webroot) {
            Ok(relative) => to_key(relative),
            Err(_) => continue,
        };

        if !compiled.includes(&relative) {
            continue;
        }

        let content = std::fs::read(entry.path())?;
        signatures.insert(relative, content_hash(&content));
    }

    log::debug!(
        "Extracted {} signatures from {}",
        signatures.len(),
        webroot.display()
    );

    Ok(signatures)
}
