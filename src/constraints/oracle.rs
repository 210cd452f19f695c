//! Selection metrics and the five feasibility rules.
//!
//! Rules are evaluated in a fixed order and the first failure is reported:
//!
//! 1. the selection is non-empty
//! 2. it holds at most `max_items` ids
//! 3. no two selected items share a category (when enabled)
//! 4. total cogs stays within the budget (`<= B + eps`)
//! 5. mean rating reaches the minimum (`+ eps >= Rmin`)
//!
//! Ids are resolved against the dataset as a set: a repeated id counts
//! once for rules 3-5 and ids missing from the dataset are ignored. Rule 2
//! counts the raw selection length.

use crate::catalog::{Dataset, ItemId};

use super::thresholds::{compute_budget, compute_min_rating};

/// Tolerance applied to every floating-point threshold comparison.
pub const EPSILON: f64 = 1e-9;

/// Aggregate figures of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    /// Sum of profit.
    pub profit: f64,
    /// Sum of cogs.
    pub cogs: f64,
    /// Mean rating.
    pub rating: f64,
}

impl Metrics {
    /// Profit earned per unit of cogs, or 0 when nothing is spent.
    pub fn efficiency(&self) -> f64 {
        if self.cogs > 0.0 {
            self.profit / self.cogs
        } else {
            0.0
        }
    }
}

/// Resolves ids to distinct dataset positions in dataset order.
fn resolve(selection: &[ItemId], dataset: &Dataset) -> Vec<usize> {
    let mut positions: Vec<usize> = selection
        .iter()
        .filter_map(|id| dataset.position(id))
        .collect();
    positions.sort_unstable();
    positions.dedup();
    positions
}

/// Metrics over distinct positions; (0, 0, 0) when empty.
fn metrics_of_positions(positions: &[usize], dataset: &Dataset) -> Metrics {
    if positions.is_empty() {
        return Metrics::default();
    }
    let items = dataset.items();
    let mut m = Metrics::default();
    for &pos in positions {
        let item = &items[pos];
        m.profit += item.profit;
        m.cogs += item.cogs;
        m.rating += item.rating;
    }
    m.rating /= positions.len() as f64;
    m
}

/// Total profit, total cogs and mean rating of the items in `selection`.
///
/// Returns `(0, 0, 0)` for an empty selection.
pub fn metrics(selection: &[ItemId], dataset: &Dataset) -> Metrics {
    metrics_of_positions(&resolve(selection, dataset), dataset)
}

/// The rule a selection failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    Empty,
    TooManyItems { count: usize, max_items: usize },
    DuplicateCategory { category: String },
    OverBudget { cogs: f64, budget: f64 },
    BelowMinRating { rating: f64, min_rating: f64 },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "selection is empty"),
            Self::TooManyItems { count, max_items } => {
                write!(f, "{count} items selected, at most {max_items} allowed")
            }
            Self::DuplicateCategory { category } => {
                write!(f, "category '{category}' selected more than once")
            }
            Self::OverBudget { cogs, budget } => {
                write!(f, "cogs {cogs:.3} exceed budget {budget:.3}")
            }
            Self::BelowMinRating { rating, min_rating } => {
                write!(f, "mean rating {rating:.3} below minimum {min_rating:.3}")
            }
        }
    }
}

/// Rule 1.
pub fn check_non_empty(count: usize) -> Result<(), Violation> {
    if count == 0 {
        return Err(Violation::Empty);
    }
    Ok(())
}

/// Rule 2.
pub fn check_max_items(count: usize, max_items: usize) -> Result<(), Violation> {
    if count > max_items {
        return Err(Violation::TooManyItems { count, max_items });
    }
    Ok(())
}

/// Rule 3: two distinct items of the same category violate the rule.
///
/// Positions outside the dataset are ignored.
pub fn check_one_per_category(positions: &[usize], dataset: &Dataset) -> Result<(), Violation> {
    let mut seen = vec![false; dataset.categories().len()];
    for &pos in positions {
        if dataset.get(pos).is_none() {
            continue;
        }
        let cat = dataset.category_index_of(pos);
        if seen[cat] {
            return Err(Violation::DuplicateCategory {
                category: dataset.categories()[cat].clone(),
            });
        }
        seen[cat] = true;
    }
    Ok(())
}

/// Rule 4.
pub fn check_budget(cogs: f64, budget: f64, eps: f64) -> Result<(), Violation> {
    if cogs > budget + eps {
        return Err(Violation::OverBudget { cogs, budget });
    }
    Ok(())
}

/// Rule 5.
pub fn check_min_rating(rating: f64, min_rating: f64, eps: f64) -> Result<(), Violation> {
    if rating + eps < min_rating {
        return Err(Violation::BelowMinRating { rating, min_rating });
    }
    Ok(())
}

/// Thresholds a selection must satisfy, fixed for a whole search run.
///
/// # Examples
///
/// ```
/// use u_assort::catalog::{Dataset, Item, ItemId};
/// use u_assort::constraints::Constraints;
///
/// let ds = Dataset::new(vec![
///     Item::new(1u64, "Drinks", 5.0, 8.0, 4.7),
///     Item::new(2u64, "Snacks", 4.0, 6.5, 4.4),
/// ]).unwrap();
/// let constraints = Constraints::new(10.0, 4.0).with_max_items(2);
/// assert!(constraints.is_feasible(&[ItemId::from(1u64), ItemId::from(2u64)], &ds));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraints {
    /// Spending cap `B`.
    pub budget: f64,
    /// Minimum mean rating `Rmin`.
    pub min_rating: f64,
    /// Maximum number of selected ids.
    pub max_items: usize,
    /// Whether each category may contribute at most one item.
    pub one_per_category: bool,
    /// Tolerance for the budget and rating comparisons.
    pub epsilon: f64,
}

impl Constraints {
    /// Creates constraints with explicit thresholds, 6 items max and
    /// one item per category.
    pub fn new(budget: f64, min_rating: f64) -> Self {
        Self {
            budget,
            min_rating,
            max_items: 6,
            one_per_category: true,
            epsilon: EPSILON,
        }
    }

    /// Derives `B` and `Rmin` from a dataset.
    pub fn from_dataset(dataset: &Dataset, alpha: f64, buffer: f64, max_items: usize) -> Self {
        Self::new(
            compute_budget(dataset, alpha),
            compute_min_rating(dataset, buffer),
        )
        .with_max_items(max_items)
    }

    pub fn with_max_items(mut self, n: usize) -> Self {
        self.max_items = n;
        self
    }

    pub fn with_one_per_category(mut self, on: bool) -> Self {
        self.one_per_category = on;
        self
    }

    pub fn with_epsilon(mut self, eps: f64) -> Self {
        self.epsilon = eps;
        self
    }

    /// Validates the thresholds.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_items == 0 {
            return Err("max_items must be at least 1".into());
        }
        if !self.budget.is_finite() {
            return Err(format!("budget must be finite, got {}", self.budget));
        }
        if !self.min_rating.is_finite() {
            return Err(format!("min_rating must be finite, got {}", self.min_rating));
        }
        if !(self.epsilon >= 0.0) {
            return Err(format!("epsilon must be non-negative, got {}", self.epsilon));
        }
        Ok(())
    }

    /// Evaluates the five rules in order, reporting the first failure.
    pub fn check(&self, selection: &[ItemId], dataset: &Dataset) -> Result<(), Violation> {
        check_non_empty(selection.len())?;
        check_max_items(selection.len(), self.max_items)?;
        let positions = resolve(selection, dataset);
        self.check_resolved(&positions, dataset).map(|_| ())
    }

    /// Whether `selection` satisfies every rule.
    pub fn is_feasible(&self, selection: &[ItemId], dataset: &Dataset) -> bool {
        self.check(selection, dataset).is_ok()
    }

    /// Full check over distinct positions; returns the metrics on success
    /// so callers need not recompute them.
    pub(crate) fn check_positions(
        &self,
        positions: &[usize],
        dataset: &Dataset,
    ) -> Result<Metrics, Violation> {
        check_non_empty(positions.len())?;
        check_max_items(positions.len(), self.max_items)?;
        self.check_resolved(positions, dataset)
    }

    fn check_resolved(&self, positions: &[usize], dataset: &Dataset) -> Result<Metrics, Violation> {
        if self.one_per_category {
            check_one_per_category(positions, dataset)?;
        }
        let m = metrics_of_positions(positions, dataset);
        check_budget(m.cogs, self.budget, self.epsilon)?;
        check_min_rating(m.rating, self.min_rating, self.epsilon)?;
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;
    use crate::constraints::{DEFAULT_BUDGET_ALPHA, DEFAULT_RATING_BUFFER};

    fn mini() -> Dataset {
        Dataset::new(vec![
            Item::new(1u64, "Drinks", 5.0, 8.0, 4.7),
            Item::new(2u64, "Snacks", 4.0, 6.5, 4.4),
            Item::new(3u64, "Fruits", 3.8, 5.2, 4.6),
            Item::new(4u64, "Drinks", 4.5, 7.0, 4.1),
            Item::new(5u64, "Snacks", 3.0, 5.8, 4.3),
        ])
        .unwrap()
    }

    fn ids(raw: &[u64]) -> Vec<ItemId> {
        raw.iter().map(|&n| ItemId::from(n)).collect()
    }

    fn default_constraints(ds: &Dataset) -> Constraints {
        Constraints::from_dataset(ds, DEFAULT_BUDGET_ALPHA, DEFAULT_RATING_BUFFER, 6)
    }

    #[test]
    fn test_metrics_empty_selection() {
        assert_eq!(metrics(&[], &mini()), Metrics::default());
    }

    #[test]
    fn test_metrics_sum_and_mean() {
        let m = metrics(&ids(&[1, 2]), &mini());
        assert!((m.profit - 14.5).abs() < 1e-9);
        assert!((m.cogs - 9.0).abs() < 1e-9);
        assert!((m.rating - 4.55).abs() < 1e-9);
        assert!((m.efficiency() - 14.5 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_ignores_repeats_and_unknown_ids() {
        let ds = mini();
        assert_eq!(metrics(&ids(&[1, 1, 99]), &ds), metrics(&ids(&[1]), &ds));
    }

    #[test]
    fn test_mini_dataset_selections() {
        let ds = mini();
        let c = default_constraints(&ds);

        // A: cogs 12.8 > 9.06
        assert!(matches!(
            c.check(&ids(&[1, 2, 3]), &ds),
            Err(Violation::OverBudget { .. })
        ));
        // B: cogs 9.0, rating 4.55
        assert!(c.is_feasible(&ids(&[1, 2]), &ds));
        // C: cogs 8.8, rating 4.65
        assert!(c.is_feasible(&ids(&[1, 3]), &ds));
        // D: both drinks
        assert!(matches!(
            c.check(&ids(&[1, 4]), &ds),
            Err(Violation::DuplicateCategory { category }) if category == "Drinks"
        ));
        // E: six ids, repeated id collapses but drinks still duplicated
        assert!(matches!(
            c.check(&ids(&[1, 2, 3, 4, 5, 1]), &ds),
            Err(Violation::DuplicateCategory { .. })
        ));
    }

    #[test]
    fn test_rule_order_short_circuits() {
        let ds = mini();
        let c = default_constraints(&ds).with_max_items(2);
        assert_eq!(c.check(&[], &ds), Err(Violation::Empty));
        // Too many items is reported before the duplicate category.
        assert!(matches!(
            c.check(&ids(&[1, 4, 2]), &ds),
            Err(Violation::TooManyItems { count: 3, max_items: 2 })
        ));
    }

    #[test]
    fn test_one_per_category_can_be_disabled() {
        let ds = mini();
        let c = Constraints::new(100.0, 0.0).with_one_per_category(false);
        assert!(c.is_feasible(&ids(&[1, 4]), &ds));
    }

    #[test]
    fn test_epsilon_absorbs_rounding() {
        assert!(check_budget(9.06 + 1e-10, 9.06, EPSILON).is_ok());
        assert!(check_budget(9.06 + 1e-6, 9.06, EPSILON).is_err());
        assert!(check_min_rating(4.5 - 1e-10, 4.5, EPSILON).is_ok());
        assert!(check_min_rating(4.5 - 1e-6, 4.5, EPSILON).is_err());
    }

    #[test]
    fn test_independent_rules() {
        let ds = mini();
        assert_eq!(check_non_empty(0), Err(Violation::Empty));
        assert!(check_non_empty(1).is_ok());
        assert!(check_max_items(6, 6).is_ok());
        assert!(check_max_items(7, 6).is_err());
        assert!(check_one_per_category(&[0, 1, 2], &ds).is_ok());
        assert!(check_one_per_category(&[1, 4], &ds).is_err());
    }

    #[test]
    fn test_one_per_category_ignores_out_of_range_positions() {
        let ds = mini();
        assert!(check_one_per_category(&[0, 99], &ds).is_ok());
        assert!(check_one_per_category(&[1, 99, 4], &ds).is_err());
    }

    #[test]
    fn test_check_positions_returns_metrics() {
        let ds = mini();
        let c = default_constraints(&ds);
        let m = c.check_positions(&[0, 1], &ds).unwrap();
        assert!((m.profit - 14.5).abs() < 1e-9);
    }

    #[test]
    fn test_validate() {
        assert!(Constraints::new(1.0, 1.0).validate().is_ok());
        assert!(Constraints::new(1.0, 1.0).with_max_items(0).validate().is_err());
        assert!(Constraints::new(f64::NAN, 1.0).validate().is_err());
        assert!(Constraints::new(1.0, 1.0).with_epsilon(-1.0).validate().is_err());
    }
}
