//! Signature database construction.
//!
//! This module handles:
//! - Per-family file-inclusion policies
//! - Hashing the tracked files of an extracted release tree
//! - Accumulating per-release signatures into the signature database
//! - Loading and saving the database as JSON

mod database;
mod extract;
mod policy;
mod store;

pub use database::{FamilySignatures, HashBuckets, SignatureDatabase};
pub use extract::{content_hash, extract_signatures};
pub use policy::{CompiledPolicy, InclusionPolicy, TRACKED_EXTENSIONS};
pub use store::{load_signatures, save_signatures};
