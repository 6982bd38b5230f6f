//! CMS family detection.
//!
//! Every family's top identifier files are requested; a family scores one
//! hit per file the site serves. Content is not compared at this stage.

use crate::candidates::CandidateDatabase;
use crate::engine::context::{ProbeFetcher, ScanContext};

/// Hit count of one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyScore {
    pub family: String,
    pub hits: usize,
}

/// Probes the first `probe_limit` identifiers of every family.
///
/// Families are visited in database order (alphabetical). Only families
/// with at least one hit are returned, in visiting order.
pub async fn score_families(
    ctx: &ScanContext,
    fetcher: &dyn ProbeFetcher,
    candidates: &CandidateDatabase,
    probe_limit: usize,
) -> Vec<FamilyScore> {
    let mut scores = Vec::new();

    for (family, family_candidates) in &candidates.families {
        log::info!("Scanning for CMS: {}", family);
        let mut hits = 0;
        for identifier in family_candidates.identifier.iter().take(probe_limit) {
            if ctx.probe(fetcher, &identifier.path).await.is_some() {
                hits += 1;
            }
        }

        ctx.observer().family_scored(family, hits);
        if hits > 0 {
            scores.push(FamilyScore {
                family: family.clone(),
                hits,
            });
        }
    }

    scores
}

/// Picks the detected family from probe scores.
///
/// - no scores: none
/// - two or more families at `probe_limit` hits: none, the server answers
///   every path with success
/// - otherwise the highest score, first family on ties, if it reaches `min_hits`
pub fn choose_family(scores: &[FamilyScore], probe_limit: usize, min_hits: usize) -> Option<String> {
    if scores.is_empty() {
        return None;
    }

    let full_matches = scores.iter().filter(|s| s.hits == probe_limit).count();
    if full_matches > 1 {
        log::info!(
            "{} families matched every probe; the server most likely answers any path with success",
            full_matches
        );
        return None;
    }

    let best = scores
        .iter()
        .fold(None::<&FamilyScore>, |best, score| match best {
            Some(b) if b.hits >= score.hits => Some(b),
            _ => Some(score),
        })?;

    if best.hits < min_hits {
        log::info!(
            "Best family {} matched only {} files, below the threshold of {}",
            best.family,
            best.hits,
            min_hits
        );
        return None;
    }

    Some(best.family.clone())
}

/// Detects the CMS family of the site.
pub async fn detect_family(
    ctx: &ScanContext,
    fetcher: &dyn ProbeFetcher,
    candidates: &CandidateDatabase,
    probe_limit: usize,
    min_hits: usize,
) -> Option<String> {
    let scores = score_families(ctx, fetcher, candidates, probe_limit).await;
    let family = choose_family(&scores, probe_limit, min_hits);
    ctx.observer().family_detected(family.as_deref());
    family
}
