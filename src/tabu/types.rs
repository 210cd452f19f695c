//! Short-term memory and step bookkeeping for the assortment tabu search.

use crate::catalog::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TabuEntry {
    item: usize,
    remaining: usize,
}

/// Recency locks of the form "category `c` must not be reassigned to item
/// `i` yet", each with a remaining lifetime in iterations.
///
/// At most one lock exists per category: recording a new reverse move for a
/// category replaces the previous lock, so the list never holds more
/// entries than there are categories. Counters are always positive while an
/// entry is present.
///
/// # Examples
///
/// ```
/// use u_assort::tabu::TabuList;
///
/// let mut tabu = TabuList::new(2);
/// tabu.insert(0, 17, 2);
/// tabu.tick();
/// assert!(tabu.is_tabu(0, 17));
/// tabu.tick();
/// assert!(!tabu.is_tabu(0, 17));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabuList {
    slots: Vec<Option<TabuEntry>>,
}

impl TabuList {
    /// Creates an empty list for `categories` categories.
    pub fn new(categories: usize) -> Self {
        Self {
            slots: vec![None; categories],
        }
    }

    /// Forbids reassigning `category` to `item` for `tenure` ticks,
    /// replacing any lock the category already holds. A zero tenure only
    /// clears the existing lock.
    ///
    /// # Panics
    /// Panics if `category` is out of range.
    pub fn insert(&mut self, category: usize, item: usize, tenure: usize) {
        self.slots[category] = (tenure > 0).then_some(TabuEntry {
            item,
            remaining: tenure,
        });
    }

    /// Whether assigning `item` to `category` is currently forbidden.
    pub fn is_tabu(&self, category: usize, item: usize) -> bool {
        self.remaining(category, item).is_some()
    }

    /// Remaining lifetime of the lock `(category, item)`, if any.
    pub fn remaining(&self, category: usize, item: usize) -> Option<usize> {
        match self.slots.get(category) {
            Some(Some(entry)) if entry.item == item => Some(entry.remaining),
            _ => None,
        }
    }

    /// Ages every lock by one iteration and evicts those that expire.
    pub fn tick(&mut self) {
        for slot in &mut self.slots {
            if let Some(entry) = slot {
                entry.remaining -= 1;
                if entry.remaining == 0 {
                    *slot = None;
                }
            }
        }
    }

    /// Number of active locks.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no lock is active.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The iteration budget was used up.
    MaxIterations,
    /// An iteration found no admissible neighbor.
    NeighborhoodExhausted,
    /// The best profit did not improve for `max_no_improve` iterations.
    Stagnation,
    /// The cancellation flag was raised.
    Cancelled,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MaxIterations => "iteration limit reached",
            Self::NeighborhoodExhausted => "no admissible neighbor",
            Self::Stagnation => "no improvement",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The swap applied by one iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapMove {
    /// Category whose item was replaced.
    pub category: String,
    /// Item that left the selection (now tabu for this category).
    pub removed: ItemId,
    /// Item that entered the selection.
    pub added: ItemId,
    /// Profit of the new current selection.
    pub profit: f64,
    /// Whether the move set a new best profit.
    pub improved: bool,
}

/// Result of a single search iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The search moved to the best admissible neighbor.
    Moved(SwapMove),
    /// No admissible neighbor exists; the search is over.
    Exhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabu_insert_and_expire() {
        let mut tabu = TabuList::new(3);
        tabu.insert(1, 4, 3);
        assert_eq!(tabu.remaining(1, 4), Some(3));
        assert!(!tabu.is_tabu(1, 5));
        assert!(!tabu.is_tabu(0, 4));

        tabu.tick();
        tabu.tick();
        assert_eq!(tabu.remaining(1, 4), Some(1));
        tabu.tick();
        assert!(tabu.is_empty());
    }

    #[test]
    fn test_tabu_one_lock_per_category() {
        let mut tabu = TabuList::new(2);
        tabu.insert(0, 1, 5);
        tabu.insert(0, 2, 5);
        assert!(!tabu.is_tabu(0, 1));
        assert!(tabu.is_tabu(0, 2));
        tabu.insert(1, 1, 5);
        assert_eq!(tabu.len(), 2);
    }

    #[test]
    fn test_tabu_overwrite_resets_tenure() {
        let mut tabu = TabuList::new(1);
        tabu.insert(0, 1, 2);
        tabu.tick();
        tabu.insert(0, 1, 4);
        assert_eq!(tabu.remaining(0, 1), Some(4));
    }

    #[test]
    fn test_tabu_zero_tenure_clears() {
        let mut tabu = TabuList::new(1);
        tabu.insert(0, 1, 2);
        tabu.insert(0, 3, 0);
        assert!(tabu.is_empty());
    }

    #[test]
    fn test_tabu_out_of_range_query() {
        let tabu = TabuList::new(1);
        assert!(!tabu.is_tabu(7, 0));
    }
}
