//! Pairwise "same product" decision between two keyword sets.

use serde::Serialize;

use crate::keywords::KeywordSet;

/// Sets larger than this need [`LONG_TITLE_OVERLAP`] shared keywords.
pub const SHORT_TITLE_MAX_KEYWORDS: usize = 2;

/// Shared keywords required when both titles are long.
pub const LONG_TITLE_OVERLAP: usize = 2;

/// Shared keywords required when either title is short.
pub const SHORT_TITLE_OVERLAP: usize = 1;

/// Overlap needed for `a` and `b` to match, or `None` when either is empty.
fn required_overlap(a: &KeywordSet, b: &KeywordSet) -> Option<usize> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a.len() > SHORT_TITLE_MAX_KEYWORDS && b.len() > SHORT_TITLE_MAX_KEYWORDS {
        Some(LONG_TITLE_OVERLAP)
    } else {
        Some(SHORT_TITLE_OVERLAP)
    }
}

/// Whether two titles look like the same product.
///
/// Long titles must share at least two keywords; a short title (two
/// keywords or fewer) on either side matches on a single shared keyword. An
/// empty set never matches. Only the intersection matters, so the relation
/// is symmetric. It is not transitive.
#[must_use]
pub fn are_similar(a: &KeywordSet, b: &KeywordSet) -> bool {
    required_overlap(a, b).is_some_and(|required| a.shared_count(b) >= required)
}

/// A similarity decision with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub shared: Vec<String>,
    /// `0` when either side is empty and no overlap can match.
    pub required: usize,
    pub similar: bool,
}

#[must_use]
pub fn compare(a: &KeywordSet, b: &KeywordSet) -> Comparison {
    let shared: Vec<String> = a.shared(b).into_iter().map(str::to_owned).collect();
    let required = required_overlap(a, b);

    Comparison {
        similar: required.is_some_and(|r| shared.len() >= r),
        required: required.unwrap_or(0),
        shared,
    }
}
