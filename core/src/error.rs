use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BudgetError {
    #[error("Category not found: '{0}'")]
    CategoryNotFound(String),

    #[error("Activity not found: '{0}'")]
    SubcategoryNotFound(String),

    #[error("Time entry not found: '{0}'")]
    EntryNotFound(String),

    #[error("Name already in use: '{0}'")]
    DuplicateName(String),

    #[error("Name must not be empty")]
    EmptyName,

    #[error("'{query}' is ambiguous, matches {matches:?}")]
    Ambiguous { query: String, matches: Vec<String> },

    #[error("Budget must be a non-negative number of hours, got {0}")]
    InvalidBudget(f64),

    #[error("Logged time must be positive, got {0}")]
    InvalidHours(f64),
}
