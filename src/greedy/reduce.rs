//! Candidate reduction: global quantile cut and per-category shortlists.
//!
//! # Ordering
//!
//! Within a category, candidates are ranked by descending [`score`]; equal
//! scores keep dataset order (stable sort). Categories in
//! [`CandidateBuckets`] are ordered lexicographically by label, which fixes
//! the order in which the search seeds and explores them.

use std::collections::BTreeMap;

use super::score::{quantile, scores};
use crate::catalog::{Dataset, ItemId};
use crate::error::AssortError;

/// Per-category shortlists of candidate ids, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateBuckets {
    buckets: BTreeMap<String, Vec<ItemId>>,
}

impl CandidateBuckets {
    /// Builds buckets from explicit shortlists.
    pub fn from_map(buckets: BTreeMap<String, Vec<ItemId>>) -> Self {
        Self { buckets }
    }

    /// Shortlist of a category.
    pub fn get(&self, category: &str) -> Option<&[ItemId]> {
        self.buckets.get(category).map(Vec::as_slice)
    }

    /// Category labels in iteration order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// `(category, shortlist)` pairs in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ItemId])> {
        self.buckets
            .iter()
            .map(|(c, ids)| (c.as_str(), ids.as_slice()))
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether there are no categories.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of candidate ids across all categories.
    pub fn total_candidates(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Dataset positions of one category's items, best score first.
fn ranked_groups(dataset: &Dataset, scores: &[f64]) -> Vec<Vec<usize>> {
    let mut groups = dataset.group_by_category();
    for group in &mut groups {
        // `sort_by` is stable: ties keep dataset order.
        group.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    }
    groups
}

/// Keeps items whose score reaches the `q`-quantile of all scores, then
/// re-inserts the best item of every category the cut emptied.
///
/// The result is an order-preserving subset of `dataset`; a rescued item
/// keeps its original position. No category present in the input is
/// missing from the output.
///
/// # Errors
/// [`AssortError::InvalidConfig`] if `q` is outside `[0, 1]`.
pub fn secure_filter(dataset: &Dataset, q: f64) -> Result<Dataset, AssortError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(AssortError::InvalidConfig(format!(
            "quantile must be in [0, 1], got {q}"
        )));
    }
    let scores = scores(dataset);
    let Some(threshold) = quantile(&scores, q) else {
        return Ok(dataset.clone());
    };

    let mut keep: Vec<bool> = scores.iter().map(|&s| s >= threshold).collect();
    let mut rescued = 0usize;
    for group in ranked_groups(dataset, &scores) {
        if group.iter().all(|&pos| !keep[pos]) {
            if let Some(&best) = group.first() {
                keep[best] = true;
                rescued += 1;
            }
        }
    }

    let reduced = dataset.filter(|pos, _| keep[pos]);
    tracing::debug!(
        input = dataset.len(),
        kept = reduced.len(),
        rescued,
        threshold,
        "secure filter applied"
    );
    Ok(reduced)
}

/// Shortlists the `k` best-scoring items of every category.
///
/// # Errors
/// [`AssortError::InvalidConfig`] if `k` is zero.
pub fn top_k_per_category(dataset: &Dataset, k: usize) -> Result<CandidateBuckets, AssortError> {
    if k == 0 {
        return Err(AssortError::InvalidConfig(
            "k_per_category must be at least 1".into(),
        ));
    }
    let scores = scores(dataset);
    let items = dataset.items();
    let buckets = ranked_groups(dataset, &scores)
        .into_iter()
        .enumerate()
        .map(|(cat, group)| {
            let ids: Vec<ItemId> = group
                .into_iter()
                .take(k)
                .map(|pos| items[pos].id.clone())
                .collect();
            (dataset.categories()[cat].clone(), ids)
        })
        .collect();
    Ok(CandidateBuckets { buckets })
}
