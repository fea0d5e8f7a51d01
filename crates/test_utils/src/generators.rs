//! Property-Based Test Generators
//!
//! proptest strategies for ledger quantities.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::ItemName;

/// Positive dozens as entered on a challan
pub fn dozens_strategy() -> impl Strategy<Value = u32> {
    1u32..10_000
}

/// Pieces per box
pub fn packing_mode_strategy() -> impl Strategy<Value = u32> {
    1u32..=144
}

/// Non-negative box counts with up to two decimal places
pub fn boxes_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Small box counts, at most 5.00, for sequences against one plan
pub fn small_boxes_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=500).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// A sequence of delivery attempts
pub fn delivery_sequence_strategy(max_len: usize) -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(small_boxes_strategy(), 1..max_len)
}

/// Rates per dozen, 0.00 to 9999.99
pub fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|paise| Decimal::new(paise, 2))
}

/// Item names of one to twelve characters
pub fn item_name_strategy() -> impl Strategy<Value = ItemName> {
    "[A-Za-z][A-Za-z0-9 -]{0,11}".prop_map(|name| {
        ItemName::parse(name).expect("generated names start with a letter")
    })
}
