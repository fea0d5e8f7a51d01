//! Delivery domain errors
//!
//! Every failure a registry, ledger or aggregator operation can report. The
//! HTTP layer maps these onto status codes through the classification
//! helpers at the bottom of this file.

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{CoreError, DeliveryId, TemporalError};
use domain_catalog::CatalogError;

/// Errors that can occur in the delivery domain
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// A challan with this number already exists
    #[error("Duplicate challan: {0}")]
    DuplicateEntry(String),

    /// The addressed challan, row, delivery or invoice does not exist
    #[error("{entity} not found: {key}")]
    NotFound {
        entity: &'static str,
        key: String,
    },

    /// Item is not in the catalog, or has no planned row on the challan
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// Write would push delivered boxes past the planned boxes
    #[error("Over-delivery: {attempted} boxes would exceed the planned {allowed} boxes")]
    OverDelivery {
        attempted: Decimal,
        allowed: Decimal,
    },

    /// An invoice with this number already exists
    #[error("Duplicate invoice: {0}")]
    DuplicateInvoice(String),

    /// Date range with `from` after `to`
    #[error("Invalid range: {0}")]
    InvalidRange(#[from] TemporalError),

    /// A natural key matched more than one delivery
    #[error("{count} deliveries match {key}; address one by delivery id")]
    AmbiguousDelivery {
        key: String,
        count: usize,
        candidates: Vec<DeliveryId>,
    },

    /// Malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backing store failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DeliveryError {
    pub fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        DeliveryError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DeliveryError::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        DeliveryError::Storage(message.into())
    }

    /// True for errors caused by the current state of the ledger
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DeliveryError::DuplicateEntry(_)
                | DeliveryError::DuplicateInvoice(_)
                | DeliveryError::OverDelivery { .. }
                | DeliveryError::AmbiguousDelivery { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DeliveryError::NotFound { .. })
    }

    /// True for anything the caller can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DeliveryError::Storage(_))
    }
}

impl From<CatalogError> for DeliveryError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownItem(item) => DeliveryError::UnknownItem(item),
            other => DeliveryError::Validation(other.to_string()),
        }
    }
}

impl From<CoreError> for DeliveryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Temporal(inner) => DeliveryError::InvalidRange(inner),
            CoreError::Validation(message) => DeliveryError::Validation(message),
            CoreError::Money(inner) => DeliveryError::Validation(inner.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_classification() {
        let over = DeliveryError::OverDelivery {
            attempted: dec!(12),
            allowed: dec!(10),
        };
        assert!(over.is_conflict());
        assert!(over.is_client_error());

        assert!(DeliveryError::not_found("Challan", "DC-1").is_not_found());
        assert!(!DeliveryError::storage("disk full").is_client_error());
    }

    #[test]
    fn test_catalog_unknown_item_maps_through() {
        let err: DeliveryError = CatalogError::UnknownItem("Cap".to_string()).into();
        assert_eq!(err, DeliveryError::UnknownItem("Cap".to_string()));
    }

    #[test]
    fn test_over_delivery_message() {
        let err = DeliveryError::OverDelivery {
            attempted: dec!(12.00),
            allowed: dec!(10.00),
        };
        assert_eq!(
            err.to_string(),
            "Over-delivery: 12.00 boxes would exceed the planned 10.00 boxes"
        );
    }
}
