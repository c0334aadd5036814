use std::fmt;

use super::Category;

/// Contract violations raised by the reconciler. State is left untouched
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    CategoryUnavailable(Category),
    CategoryNotApplied(Category),
    UnknownCategory(String),
    DuplicateValue { category: Category, id: String },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::CategoryUnavailable(category) => {
                write!(f, "Category '{}' is not available to add", category)
            }
            FilterError::CategoryNotApplied(category) => {
                write!(f, "Category '{}' has not been added", category)
            }
            FilterError::UnknownCategory(raw) => write!(f, "Unknown filter category '{}'", raw),
            FilterError::DuplicateValue { category, id } => {
                write!(f, "Value '{}' appears more than once in '{}'", id, category)
            }
        }
    }
}

impl std::error::Error for FilterError {}
