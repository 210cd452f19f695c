//! Candidate reducer.
//!
//! Scores every item greedily and shrinks the catalog to a bounded
//! per-category pool before the search starts:
//!
//! - [`secure_filter`] drops items below a global score quantile while
//!   guaranteeing that every category keeps at least one item.
//! - [`top_k_per_category`] keeps the `k` best items of each category as
//!   [`CandidateBuckets`], which bound the size of every neighborhood.

mod reduce;
mod score;

pub use reduce::{secure_filter, top_k_per_category, CandidateBuckets};
pub use score::{quantile, score, scores};
