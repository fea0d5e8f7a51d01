//! Catalog errors

use thiserror::Error;

/// Errors raised while loading or querying the pricing catalog
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Item is not part of the catalog
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// Item listed more than once
    #[error("Duplicate catalog item: {0}")]
    DuplicateItem(String),

    /// Packing mode must be a positive number of pieces per box
    #[error("Invalid packing mode for item {0}: must be positive")]
    InvalidPackingMode(String),

    /// Rates per dozen cannot be negative
    #[error("Invalid rate for item {0}: must not be negative")]
    NegativeRate(String),

    /// The catalog has no items
    #[error("Catalog contains no items")]
    Empty,

    /// The catalog source could not be read or parsed
    #[error("Failed to load catalog: {0}")]
    Load(String),
}

impl From<config::ConfigError> for CatalogError {
    fn from(err: config::ConfigError) -> Self {
        CatalogError::Load(err.to_string())
    }
}
