//! Feasibility oracle.
//!
//! Pure functions deciding whether a selection respects the spending cap,
//! the minimum mean rating, the item limit and the one-per-category rule.
//! Thresholds are computed once per run (see [`compute_budget`] and
//! [`compute_min_rating`]) and carried in a [`Constraints`] value, so they
//! stay fixed even when the search works on a filtered dataset.

mod oracle;
mod thresholds;

pub use oracle::{
    check_budget, check_max_items, check_min_rating, check_non_empty, check_one_per_category,
    metrics, Constraints, Metrics, Violation, EPSILON,
};
pub use thresholds::{
    compute_budget, compute_min_rating, DEFAULT_BUDGET_ALPHA, DEFAULT_RATING_BUFFER,
};
