//! Tabu Search configuration.

use crate::catalog::Dataset;
use crate::constraints::{
    compute_budget, compute_min_rating, Constraints, DEFAULT_BUDGET_ALPHA, DEFAULT_RATING_BUFFER,
};

/// Configuration parameters for the assortment Tabu Search.
///
/// # Examples
///
/// ```
/// use u_assort::tabu::TabuConfig;
///
/// let config = TabuConfig::default()
///     .with_max_iterations(1000)
///     .with_tabu_tenure(7)
///     .with_aspiration(true);
/// assert_eq!(config.max_iterations, 1000);
/// assert_eq!(config.tabu_tenure, 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabuConfig {
    /// Candidates kept per category.
    pub k_per_category: usize,
    /// Maximum number of items in a selection.
    pub max_items: usize,
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// How many iterations a reverse move stays in the tabu list.
    pub tabu_tenure: usize,
    /// Whether to use aspiration criterion (override tabu if the move
    /// produces a new global best).
    pub aspiration: bool,
    /// Randomized draws tried when the deterministic seed is infeasible.
    pub max_init_tries: usize,
    /// Maximum iterations without improvement before stopping (None to
    /// run until the iteration limit or exhaustion).
    pub max_no_improve: Option<usize>,
    /// Score quantile for the secure filter pre-pass (None to skip it).
    pub filter_quantile: Option<f64>,
    /// Scale applied to the per-category cogs ceiling to derive the budget.
    pub budget_alpha: f64,
    /// Margin added to the mean rating to derive the minimum rating.
    pub rating_buffer: f64,
    /// Fixed budget; overrides `budget_alpha`.
    pub budget: Option<f64>,
    /// Fixed minimum rating; overrides `rating_buffer`.
    pub min_rating: Option<f64>,
    /// Whether each category contributes at most one item.
    pub one_per_category: bool,
    /// Random seed (None for the default seed).
    pub seed: Option<u64>,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            k_per_category: 3,
            max_items: 6,
            max_iterations: 100,
            tabu_tenure: 7,
            aspiration: true,
            max_init_tries: 1000,
            max_no_improve: None,
            filter_quantile: None,
            budget_alpha: DEFAULT_BUDGET_ALPHA,
            rating_buffer: DEFAULT_RATING_BUFFER,
            budget: None,
            min_rating: None,
            one_per_category: true,
            seed: None,
        }
    }
}

impl TabuConfig {
    /// Sets the number of candidates kept per category.
    pub fn with_k_per_category(mut self, k: usize) -> Self {
        self.k_per_category = k;
        self
    }

    /// Sets the maximum selection size.
    pub fn with_max_items(mut self, n: usize) -> Self {
        self.max_items = n;
        self
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the tabu tenure (number of iterations a move remains tabu).
    pub fn with_tabu_tenure(mut self, tenure: usize) -> Self {
        self.tabu_tenure = tenure;
        self
    }

    /// Enables or disables aspiration criterion.
    pub fn with_aspiration(mut self, aspiration: bool) -> Self {
        self.aspiration = aspiration;
        self
    }

    /// Sets the number of randomized construction attempts.
    pub fn with_max_init_tries(mut self, n: usize) -> Self {
        self.max_init_tries = n;
        self
    }

    /// Sets maximum iterations without improvement.
    pub fn with_max_no_improve(mut self, n: usize) -> Self {
        self.max_no_improve = Some(n);
        self
    }

    /// Enables the secure filter pre-pass at quantile `q`.
    pub fn with_filter_quantile(mut self, q: f64) -> Self {
        self.filter_quantile = Some(q);
        self
    }

    pub fn with_budget_alpha(mut self, alpha: f64) -> Self {
        self.budget_alpha = alpha;
        self
    }

    pub fn with_rating_buffer(mut self, buffer: f64) -> Self {
        self.rating_buffer = buffer;
        self
    }

    /// Uses a precomputed budget instead of deriving one.
    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Uses a precomputed minimum rating instead of deriving one.
    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = Some(min_rating);
        self
    }

    pub fn with_one_per_category(mut self, on: bool) -> Self {
        self.one_per_category = on;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Thresholds for a run over `dataset`. Derived values always come from
    /// the full dataset, never from the filtered candidate pool.
    pub fn constraints_for(&self, dataset: &Dataset) -> Constraints {
        let budget = self
            .budget
            .unwrap_or_else(|| compute_budget(dataset, self.budget_alpha));
        let min_rating = self
            .min_rating
            .unwrap_or_else(|| compute_min_rating(dataset, self.rating_buffer));
        Constraints::new(budget, min_rating)
            .with_max_items(self.max_items)
            .with_one_per_category(self.one_per_category)
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.k_per_category == 0 {
            return Err("k_per_category must be at least 1".into());
        }
        if self.max_items == 0 {
            return Err("max_items must be at least 1".into());
        }
        if self.max_no_improve == Some(0) {
            return Err("max_no_improve must be positive or None".into());
        }
        if let Some(q) = self.filter_quantile {
            if !(0.0..=1.0).contains(&q) {
                return Err(format!("filter_quantile must be in [0, 1], got {q}"));
            }
        }
        if !self.budget_alpha.is_finite() {
            return Err(format!("budget_alpha must be finite, got {}", self.budget_alpha));
        }
        if !self.rating_buffer.is_finite() {
            return Err(format!(
                "rating_buffer must be finite, got {}",
                self.rating_buffer
            ));
        }
        if matches!(self.budget, Some(b) if !b.is_finite()) {
            return Err("budget must be finite".into());
        }
        if matches!(self.min_rating, Some(r) if !r.is_finite()) {
            return Err("min_rating must be finite".into());
        }
        Ok(())
    }
}
