//! Typed catalog records.

use std::collections::{HashMap, HashSet};

use crate::error::AssortError;

/// Unique product key.
///
/// Stored as text so that both numeric (`17`) and coded (`"SKU-17"`)
/// identifiers can be used.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(String);

impl ItemId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// An immutable product record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    /// Unique key.
    pub id: ItemId,
    /// Category label.
    pub category: String,
    /// Cost of goods sold (non-negative).
    pub cogs: f64,
    /// Profit contributed when selected.
    pub profit: f64,
    /// Customer rating, typically in `[0, 5]`.
    pub rating: f64,
}

impl Item {
    /// Creates an item.
    pub fn new(
        id: impl Into<ItemId>,
        category: impl Into<String>,
        cogs: f64,
        profit: f64,
        rating: f64,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            cogs,
            profit,
            rating,
        }
    }

    fn validate(&self) -> Result<(), AssortError> {
        let invalid = |field: &'static str, value: f64| AssortError::InvalidItem {
            id: self.id.clone(),
            field,
            value,
        };
        if !self.cogs.is_finite() || self.cogs < 0.0 {
            return Err(invalid("cogs", self.cogs));
        }
        if !self.profit.is_finite() {
            return Err(invalid("profit", self.profit));
        }
        if !self.rating.is_finite() {
            return Err(invalid("rating", self.rating));
        }
        Ok(())
    }
}

/// An ordered, immutable collection of items.
///
/// Categories are interned in first-appearance order; every item position
/// maps to a category index into [`Dataset::categories`].
#[derive(Debug, Clone)]
pub struct Dataset {
    items: Vec<Item>,
    categories: Vec<String>,
    item_category: Vec<usize>,
    positions: HashMap<ItemId, usize>,
}

impl Dataset {
    /// Builds a dataset, rejecting duplicate ids, non-finite values and
    /// negative cogs.
    pub fn new(items: Vec<Item>) -> Result<Self, AssortError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            item.validate()?;
            if !seen.insert(&item.id) {
                return Err(AssortError::DuplicateItem(item.id.clone()));
            }
        }
        Ok(Self::from_unique(items))
    }

    fn from_unique(items: Vec<Item>) -> Self {
        let mut categories: Vec<String> = Vec::new();
        let mut category_lookup: HashMap<String, usize> = HashMap::new();
        let mut item_category = Vec::with_capacity(items.len());
        let mut positions = HashMap::with_capacity(items.len());

        for (pos, item) in items.iter().enumerate() {
            positions.insert(item.id.clone(), pos);
            let cat = match category_lookup.get(&item.category) {
                Some(&c) => c,
                None => {
                    let c = categories.len();
                    categories.push(item.category.clone());
                    category_lookup.insert(item.category.clone(), c);
                    c
                }
            };
            item_category.push(cat);
        }

        Self {
            items,
            categories,
            item_category,
            positions,
        }
    }

    /// Builds a dataset from any item source.
    pub fn try_from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Result<Self, AssortError> {
        Self::new(iter.into_iter().collect())
    }

    /// All items in input order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the dataset has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at a position.
    pub fn get(&self, pos: usize) -> Option<&Item> {
        self.items.get(pos)
    }

    /// Position of the item with the given id.
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Distinct category labels in first-appearance order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Category index of the item at `pos`.
    ///
    /// # Panics
    /// Panics if `pos` is out of bounds.
    pub fn category_index_of(&self, pos: usize) -> usize {
        self.item_category[pos]
    }

    /// Item positions grouped by category index, each group in input order.
    pub fn group_by_category(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.categories.len()];
        for (pos, &cat) in self.item_category.iter().enumerate() {
            groups[cat].push(pos);
        }
        groups
    }

    /// Highest cogs within each category, indexed like [`Dataset::categories`].
    pub fn max_cogs_per_category(&self) -> Vec<f64> {
        let mut max = vec![f64::NEG_INFINITY; self.categories.len()];
        for (item, &cat) in self.items.iter().zip(&self.item_category) {
            if item.cogs > max[cat] {
                max[cat] = item.cogs;
            }
        }
        max
    }

    /// Mean rating over all items; 0 for an empty dataset.
    pub fn mean_rating(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.items.iter().map(|i| i.rating).sum::<f64>() / self.items.len() as f64
    }

    /// Returns the subset of items for which `keep(position, item)` holds,
    /// preserving input order.
    pub fn filter<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(usize, &Item) -> bool,
    {
        let items: Vec<Item> = self
            .items
            .iter()
            .enumerate()
            .filter(|(pos, item)| keep(*pos, item))
            .map(|(_, item)| item.clone())
            .collect();
        // A subset of unique ids is unique.
        Dataset::from_unique(items)
    }
}
