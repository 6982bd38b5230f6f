//! Dotted-numeric version ordering.
//!
//! CMS release strings are compared segment by segment as numbers, never
//! lexically, so `5.10.0` sorts after `5.9.3`. Pre-release markers follow the
//! usual release ladder: `dev < alpha < beta < RC < release < pl`.

use std::cmp::Ordering;

/// One canonical segment of a version string.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Number(u64),
    Label(u8),
}

/// Rank a plain numeric segment holds on the release ladder.
const RELEASE_RANK: u8 = 5;

fn label_rank(label: &str) -> u8 {
    match label.to_ascii_lowercase().as_str() {
        "dev" => 1,
        "alpha" | "a" => 2,
        "beta" | "b" => 3,
        "rc" => 4,
        "pl" | "p" => 6,
        _ => 0,
    }
}

/// Splits a version into segments.
///
/// Separators (`.`, `-`, `_`, `+`) split segments, and so does every switch
/// between digits and letters: `4.0.0-rc1` and `4.0.0rc1` both become
/// `[4, 0, 0, rc, 1]`.
fn segments(version: &str) -> Vec<Segment> {
    let mut parts = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, parts: &mut Vec<Segment>| {
        if current.is_empty() {
            return;
        }
        let segment = match current.parse::<u64>() {
            Ok(n) => Segment::Number(n),
            Err(_) => Segment::Label(label_rank(current)),
        };
        parts.push(segment);
        current.clear();
    };

    for c in version.trim().chars() {
        if matches!(c, '.' | '-' | '_' | '+') {
            flush(&mut current, &mut parts);
            continue;
        }
        if let Some(last) = current.chars().last() {
            if last.is_ascii_digit() != c.is_ascii_digit() {
                flush(&mut current, &mut parts);
            }
        }
        current.push(c);
    }
    flush(&mut current, &mut parts);

    parts
}

fn compare_segments(a: &Segment, b: &Segment) -> Ordering {
    match (a, b) {
        (Segment::Number(x), Segment::Number(y)) => x.cmp(y),
        (Segment::Number(_), Segment::Label(rank)) => RELEASE_RANK.cmp(rank),
        (Segment::Label(rank), Segment::Number(_)) => rank.cmp(&RELEASE_RANK),
        (Segment::Label(x), Segment::Label(y)) => x.cmp(y),
    }
}

/// A segment present on one side only.
///
/// A trailing number makes a version newer (`1.0.1 > 1.0`), a trailing
/// pre-release label makes it older (`1.0rc1 < 1.0`).
fn compare_trailing(segment: &Segment) -> Ordering {
    match segment {
        Segment::Number(_) => Ordering::Greater,
        Segment::Label(rank) => rank.cmp(&RELEASE_RANK),
    }
}

/// Compares two version strings using dotted-numeric ordering.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use cms_version_scanner::version::compare_versions;
///
/// assert_eq!(compare_versions("5.10.0", "5.9.3"), Ordering::Greater);
/// assert_eq!(compare_versions("4.0.0-rc1", "4.0.0"), Ordering::Less);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);

    for i in 0..left.len().max(right.len()) {
        let ordering = match (left.get(i), right.get(i)) {
            (Some(x), Some(y)) => compare_segments(x, y),
            (Some(x), None) => compare_trailing(x),
            (None, Some(y)) => compare_trailing(y).reverse(),
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// Returns true when `version` is the same release as `reference` or newer.
pub fn is_at_least(version: &str, reference: &str) -> bool {
    compare_versions(version, reference) != Ordering::Less
}

/// Sorts version strings ascending, oldest release first.
pub fn sort_versions(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_numeric_not_lexical() {
        assert_eq!(compare_versions("5.10.0", "5.9.3"), Ordering::Greater);
        assert_eq!(compare_versions("10.0", "9.5.1"), Ordering::Greater);
        assert_eq!(compare_versions("3.9.28", "3.10.0"), Ordering::Less);
    }

    #[test]
    fn test_equal_versions() {
        assert_eq!(compare_versions("5.2.1", "5.2.1"), Ordering::Equal);
        assert!(is_at_least("5.2.1", "5.2.1"));
    }

    #[test]
    fn test_trailing_segments() {
        assert_eq!(compare_versions("1.0.1", "1.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Less);
    }

    #[test]
    fn test_prerelease_ladder() {
        assert_eq!(compare_versions("4.0.0-rc1", "4.0.0"), Ordering::Less);
        assert_eq!(compare_versions("4.0.0rc1", "4.0.0-rc1"), Ordering::Equal);
        assert_eq!(compare_versions("8.0.0-beta2", "8.0.0-rc1"), Ordering::Less);
        assert_eq!(compare_versions("8.0.0-alpha1", "8.0.0-beta1"), Ordering::Less);
        assert_eq!(compare_versions("8.0.0-dev", "8.0.0-alpha1"), Ordering::Less);
        assert_eq!(compare_versions("1.0pl1", "1.0"), Ordering::Greater);
    }

    #[test]
    fn test_is_at_least() {
        assert!(!is_at_least("5.2.0", "5.2.1"));
        assert!(is_at_least("5.2.2", "5.2.1"));
    }

    #[test]
    fn test_sort_versions() {
        let mut versions = vec![
            "3.10.0".to_string(),
            "3.9.1".to_string(),
            "3.9.10".to_string(),
            "3.9.2".to_string(),
        ];
        sort_versions(&mut versions);
        assert_eq!(versions, vec!["3.9.1", "3.9.2", "3.9.10", "3.10.0"]);
    }

    proptest! {
        #[test]
        fn prop_compare_is_antisymmetric(
            a in "[0-9]{1,2}(\\.[0-9]{1,2}){0,3}(-(rc|beta|alpha)[0-9])?",
            b in "[0-9]{1,2}(\\.[0-9]{1,2}){0,3}(-(rc|beta|alpha)[0-9])?",
        ) {
            prop_assert_eq!(compare_versions(&a, &b), compare_versions(&b, &a).reverse());
        }

        #[test]
        fn prop_compare_is_reflexive(a in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}") {
            prop_assert_eq!(compare_versions(&a, &a), Ordering::Equal);
        }

        #[test]
        fn prop_patch_bump_is_newer(major in 0u64..50, minor in 0u64..50, patch in 0u64..50) {
            let base = format!("{}.{}.{}", major, minor, patch);
            let bumped = format!("{}.{}.{}", major, minor, patch + 1);
            prop_assert!(is_at_least(&bumped, &base));
            prop_assert!(!is_at_least(&base, &bumped));
        }
    }
}
