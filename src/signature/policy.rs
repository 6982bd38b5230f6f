//! Per-family file-inclusion policy.
//!
//! A policy decides which files of an extracted release tree are hashed:
//! only static assets with a tracked extension, below the family's web root,
//! outside ignored folders and not carrying an ignored file name.

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::RegexSet;

use crate::error_handling::SignatureError;

/// File extensions whose content is served verbatim by a web server.
pub const TRACKED_EXTENSIONS: &[&str] = &[
    "js", "css", "png", "jpg", "gif", "sql", "txt", "html", "md", "sh",
];

/// Directory names of version control systems, never hashed.
pub const VCS_DIRECTORIES: &[&str] = &[".git", ".svn", "_svn", ".hg", ".bzr", "CVS", "_darcs"];

/// File-inclusion policy for one CMS family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionPolicy {
    /// Regular expressions matched against the root-relative file path
    pub ignored_folders: Vec<String>,
    /// Glob patterns matched against the file name
    pub ignored_filenames: Vec<String>,
    /// Sub-directory of the release tree that is served as the web root
    pub webroot: String,
}

impl Default for InclusionPolicy {
    fn default() -> Self {
        Self {
            ignored_folders: Vec::new(),
            ignored_filenames: Vec::new(),
            webroot: "/".to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl InclusionPolicy {
    /// Returns the built-in policy of a supported family.
    pub fn for_family(family: &str) -> Option<Self> {
        let policy = match family {
            "Drupal" => InclusionPolicy {
                ignored_filenames: strings(&["index.html", ".htaccess"]),
                ignored_folders: strings(&["^vendor"]),
                ..Default::default()
            },
            "Wordpress" => InclusionPolicy {
                ignored_filenames: strings(&["index.html", ".htaccess"]),
                webroot: "/wordpress".to_string(),
                ..Default::default()
            },
            "Typo3" => InclusionPolicy {
                ignored_filenames: strings(&["index.html", ".htaccess"]),
                ignored_folders: strings(&[
                    "^install",
                    "^dev",
                    "^t3lib",
                    "^build",
                    ".*/Private/.*",
                    ".*sysext/install.*",
                ]),
                webroot: "/typo3".to_string(),
            },
            "Joomla" => InclusionPolicy {
                ignored_filenames: strings(&["index.html", "joomla.xml", ".htaccess"]),
                ignored_folders: strings(&["^installation", "^libraries", "^build"]),
                ..Default::default()
            },
            _ => return None,
        };
        Some(policy)
    }

    /// Names of all families with a built-in policy.
    pub fn builtin_families() -> &'static [&'static str] {
        &["Drupal", "Joomla", "Typo3", "Wordpress"]
    }

    /// Compiles the policy patterns.
    ///
    /// # Errors
    ///
    /// Returns `SignatureError::InvalidPattern` if a folder regex or a file
    /// name glob does not compile.
    pub fn compile(&self) -> Result<CompiledPolicy, SignatureError> {
        let ignored_folders =
            RegexSet::new(&self.ignored_folders).map_err(|e| SignatureError::InvalidPattern {
                pattern: self.ignored_folders.join(", "),
                reason: e.to_string(),
            })?;

        let mut builder = GlobSetBuilder::new();
        for pattern in &self.ignored_filenames {
            let glob = Glob::new(pattern).map_err(|e| SignatureError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            builder.add(glob);
        }
        let ignored_filenames = builder.build().map_err(|e| SignatureError::InvalidPattern {
            pattern: self.ignored_filenames.join(", "),
            reason: e.to_string(),
        })?;

        Ok(CompiledPolicy {
            ignored_folders,
            ignored_filenames,
        })
    }
}

/// Compiled form of an `InclusionPolicy`.
#[derive(Debug, Clone)]
pub struct CompiledPolicy {
    ignored_folders: RegexSet,
    ignored_filenames: GlobSet,
}

impl CompiledPolicy {
    /// Decides whether a root-relative file path is hashed.
    pub fn includes(&self, relative_path: &str) -> bool {
        let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);

        let tracked = file_name
            .rsplit_once('.')
            .map(|(_, ext)| TRACKED_EXTENSIONS.contains(&ext))
            .unwrap_or(false);

        tracked
            && !self.ignored_filenames.is_match(file_name)
            && !self.ignored_folders.is_match(relative_path)
    }
}
