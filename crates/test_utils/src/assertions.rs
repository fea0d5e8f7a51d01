//! Custom Test Assertions
//!
//! Assertion helpers for ledger types that give more useful failure messages
//! than a bare `assert_eq!`.

use rust_decimal::Decimal;

use domain_delivery::{ChallanStatus, DeliveryError, InvoiceStatement};

/// Asserts two box counts are equal regardless of decimal scale
pub fn assert_boxes_eq(actual: Decimal, expected: Decimal) {
    assert_eq!(
        actual.normalize(),
        expected.normalize(),
        "Expected {} boxes, got {}",
        expected,
        actual
    );
}

/// Asserts no row of the challan has more delivered than planned
pub fn assert_within_plan(status: &ChallanStatus) {
    for progress in &status.items {
        assert!(
            progress.delivered <= progress.planned,
            "{}/{} delivered {} boxes against a plan of {}",
            status.dc_number,
            progress.item,
            progress.delivered,
            progress.planned
        );
    }
}

/// Asserts the error is an over-delivery with the given figures
pub fn assert_over_delivery(
    result: Result<impl std::fmt::Debug, DeliveryError>,
    attempted: Decimal,
    allowed: Decimal,
) {
    match result {
        Err(DeliveryError::OverDelivery {
            attempted: actual_attempted,
            allowed: actual_allowed,
        }) => {
            assert_boxes_eq(actual_attempted, attempted);
            assert_boxes_eq(actual_allowed, allowed);
        }
        other => panic!("Expected OverDelivery({attempted} > {allowed}), got {other:?}"),
    }
}

/// Asserts the error is `NotFound`
pub fn assert_not_found(result: Result<impl std::fmt::Debug, DeliveryError>) {
    match result {
        Err(err) if err.is_not_found() => {}
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

/// Asserts the invoice total equals the sum of its line amounts
pub fn assert_invoice_balanced(statement: &InvoiceStatement) {
    let sum: Decimal = statement.lines.iter().map(|line| line.amount.amount()).sum();
    assert_eq!(
        statement.total.amount(),
        sum,
        "Invoice {} total {} does not match line sum {}",
        statement.number,
        statement.total.amount(),
        sum
    );
}
