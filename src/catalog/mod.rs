//! Product catalog: typed item records and the loader that produces them.
//!
//! The optimizer only ever sees a [`Dataset`]; where its rows came from
//! (a CSV file, a network call, in-memory construction) is irrelevant to
//! the algorithms. [`CatalogLoader`] covers the delimited-text case.

mod loader;
mod types;

pub use loader::{CatalogLoader, ColumnMap, LoadError};
pub use types::{Dataset, Item, ItemId};
