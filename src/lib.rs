//! Constrained product-assortment selection.
//!
//! Picks at most one product per category so that total profit is as high
//! as possible while total cost stays within a budget and the mean rating
//! stays above a floor:
//!
//! - **Catalog**: typed item records and a delimited-text loader.
//! - **Constraints**: the feasibility oracle (budget, minimum rating,
//!   item limit, one item per category) and selection metrics.
//! - **Greedy**: score-based candidate reduction into per-category
//!   shortlists.
//! - **Tabu Search (TS)**: swap-neighborhood local search with short-term
//!   memory and aspiration, returning the best feasible selection found.
//!
//! The search guarantees a feasible, locally improved selection, not a
//! global optimum.
//!
//! # Example
//!
//! ```
//! use u_assort::catalog::CatalogLoader;
//! use u_assort::tabu::{TabuConfig, TabuRunner};
//!
//! let csv = "product id,category,cogs,profit,rating
//! 1,Drinks,5.0,8.0,4.7
//! 2,Snacks,4.0,6.5,4.4
//! 3,Fruits,3.8,5.2,4.6
//! 4,Drinks,4.5,7.0,4.1
//! 5,Snacks,3.0,5.8,4.3
//! ";
//! let dataset = CatalogLoader::new().from_str(csv).unwrap();
//! let config = TabuConfig::default().with_budget(13.0).with_seed(42);
//! let result = TabuRunner::run(&dataset, &config).unwrap();
//! assert!((result.profit() - 19.7).abs() < 1e-9);
//! ```

pub mod catalog;
pub mod constraints;
pub mod error;
pub mod greedy;
pub mod tabu;

pub use error::AssortError;
