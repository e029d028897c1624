//! Trend scoring over one batch of listings.
//!
//! A listing's trend score is `1 +` the number of other listings in the
//! batch it is similar to, i.e. its degree in the similarity graph. Matches
//! are counted directly; there is no clustering, so `A ~ B ~ C` with
//! `A !~ C` gives A and C a score of 2 each.

use std::collections::HashMap;

use trendscout_core::Listing;

use crate::keywords::{normalize, KeywordSet};
use crate::similarity::are_similar;

/// Batch size above which [`score_auto`] switches to [`score_indexed`].
pub const DEFAULT_INDEXED_THRESHOLD: usize = 500;

/// Annotate every listing with its trend score by comparing all pairs.
///
/// Output has the same length and order as the input.
#[must_use]
pub fn score(listings: Vec<Listing>) -> Vec<Listing> {
    let keywords = keyword_sets(&listings);
    let degrees = pairwise_degrees(&keywords);
    annotate(listings, &degrees)
}

/// Same result as [`score`], but only compares pairs that share at least one
/// keyword, found through an inverted index. Pairs with no shared keyword can
/// never be similar, so nothing is lost by skipping them.
#[must_use]
pub fn score_indexed(listings: Vec<Listing>) -> Vec<Listing> {
    let keywords = keyword_sets(&listings);
    let degrees = indexed_degrees(&keywords);
    annotate(listings, &degrees)
}

/// [`score`] for batches up to `threshold` listings, [`score_indexed`] above.
#[must_use]
pub fn score_auto(listings: Vec<Listing>, threshold: usize) -> Vec<Listing> {
    if listings.len() > threshold {
        tracing::debug!(listings = listings.len(), threshold, "using indexed scorer");
        score_indexed(listings)
    } else {
        score(listings)
    }
}

/// Stable sort by trend score, highest first. Equal scores keep their input
/// order.
#[must_use]
pub fn rank(mut listings: Vec<Listing>) -> Vec<Listing> {
    listings.sort_by(|a, b| b.trend_score.cmp(&a.trend_score));
    listings
}

fn keyword_sets(listings: &[Listing]) -> Vec<KeywordSet> {
    listings.iter().map(|l| normalize(&l.title)).collect()
}

fn pairwise_degrees(keywords: &[KeywordSet]) -> Vec<usize> {
    let mut degrees = vec![0usize; keywords.len()];

    for i in 0..keywords.len() {
        for j in (i + 1)..keywords.len() {
            if are_similar(&keywords[i], &keywords[j]) {
                degrees[i] += 1;
                degrees[j] += 1;
            }
        }
    }

    degrees
}

fn indexed_degrees(keywords: &[KeywordSet]) -> Vec<usize> {
    let mut postings: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, set) in keywords.iter().enumerate() {
        for keyword in set.iter() {
            postings.entry(keyword).or_default().push(idx);
        }
    }

    let mut degrees = vec![0usize; keywords.len()];
    // Last `i` that marked each candidate; avoids clearing a seen-set per row.
    let mut seen_by = vec![usize::MAX; keywords.len()];

    for (i, set) in keywords.iter().enumerate() {
        for keyword in set.iter() {
            let Some(ids) = postings.get(keyword) else {
                continue;
            };
            for &j in ids {
                if j <= i || seen_by[j] == i {
                    continue;
                }
                seen_by[j] = i;
                if are_similar(set, &keywords[j]) {
                    degrees[i] += 1;
                    degrees[j] += 1;
                }
            }
        }
    }

    degrees
}

fn annotate(listings: Vec<Listing>, degrees: &[usize]) -> Vec<Listing> {
    listings
        .into_iter()
        .zip(degrees)
        .map(|(listing, &degree)| {
            let score = u32::try_from(degree.saturating_add(1)).unwrap_or(u32::MAX);
            listing.with_trend_score(score)
        })
        .collect()
}
