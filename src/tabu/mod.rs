//! Tabu Search (TS) over product assortments.
//!
//! A single-solution trajectory metaheuristic: starting from a feasible
//! selection (one item per category), every iteration swaps the item of
//! exactly one category for another shortlisted candidate. A tabu list
//! forbids undoing recent swaps so the search does not cycle, and the
//! aspiration criterion lifts that ban for swaps that would set a new best
//! profit.
//!
//! [`TabuRunner`] drives complete runs; [`TabuSearch`] exposes the same
//! engine one iteration at a time.
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Glover, F. (1990). "Tabu Search—Part II", *ORSA Journal on Computing* 2(1), 4-32.

mod config;
mod runner;
mod search;
mod types;

pub use config::TabuConfig;
pub use runner::{sweep, tabu_search, TabuResult, TabuRunner};
pub use search::TabuSearch;
pub use types::{StepOutcome, SwapMove, TabuList, Termination};
