//! Candidate database.
//!
//! This module handles:
//! - The candidate data model (`candidates.json`)
//! - Selecting identifier and proof files from accumulated signatures
//! - Loading (with validation) and saving the database

mod models;
mod selector;
mod store;

pub use models::{CandidateDatabase, FamilyCandidates, IdentifierCandidate, VersionProof};
pub use selector::{build_candidates, identifier_candidates, version_proofs};
pub use store::{load_candidates, save_candidates};
