//! Error taxonomy shared by every component.

use crate::catalog::{ItemId, LoadError};

/// Errors surfaced by dataset construction, candidate reduction and search.
///
/// Infeasible selections are *not* errors: the oracle answers them with
/// `false` / a [`Violation`](crate::constraints::Violation). The only fatal
/// search outcome is [`AssortError::NoFeasibleInitial`].
#[derive(Debug)]
pub enum AssortError {
    /// A configuration parameter is out of range.
    InvalidConfig(String),
    /// The dataset contains no items.
    EmptyDataset,
    /// Two items share the same id.
    DuplicateItem(ItemId),
    /// An item carries a non-finite value or negative cogs.
    InvalidItem {
        id: ItemId,
        field: &'static str,
        value: f64,
    },
    /// A candidate id does not exist in the evaluation dataset.
    UnknownItem(ItemId),
    /// Neither the deterministic seed nor any randomized draw was feasible.
    NoFeasibleInitial {
        /// Randomized attempts made after the seed failed.
        attempts: usize,
    },
    /// Reading the catalog failed.
    Load(Box<LoadError>),
}

impl std::fmt::Display for AssortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::EmptyDataset => write!(f, "dataset contains no items"),
            Self::DuplicateItem(id) => write!(f, "duplicate product id '{id}'"),
            Self::InvalidItem { id, field, value } => {
                write!(f, "product id '{id}' has invalid {field} {value}")
            }
            Self::UnknownItem(id) => write!(f, "product id '{id}' is not in the dataset"),
            Self::NoFeasibleInitial { attempts } => write!(
                f,
                "no feasible initial selection found after {attempts} randomized attempts"
            ),
            Self::Load(e) => write!(f, "load error: {e}"),
        }
    }
}

impl std::error::Error for AssortError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<LoadError> for AssortError {
    fn from(e: LoadError) -> Self {
        Self::Load(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            AssortError::InvalidConfig("k must be at least 1".into()).to_string(),
            "invalid configuration: k must be at least 1"
        );
        assert_eq!(
            AssortError::DuplicateItem(ItemId::from(7u64)).to_string(),
            "duplicate product id '7'"
        );
        assert_eq!(
            AssortError::NoFeasibleInitial { attempts: 1000 }.to_string(),
            "no feasible initial selection found after 1000 randomized attempts"
        );
        assert_eq!(
            AssortError::InvalidItem {
                id: ItemId::from(3u64),
                field: "cogs",
                value: -4.0,
            }
            .to_string(),
            "product id '3' has invalid cogs -4"
        );
    }

    #[test]
    fn test_load_error_is_source() {
        use std::error::Error;
        let err = AssortError::from(LoadError::EmptyInput);
        assert!(err.source().is_some());
    }
}
