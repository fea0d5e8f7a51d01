//! Quantity conversions between dozens, pieces and boxes
//!
//! Every quantity the engine emits (planned boxes, delivered boxes, dozens)
//! goes through [`round_quantity`], so display, invoicing and export always
//! agree on the same two-decimal value.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of pieces in one dozen
pub const PIECES_PER_DOZEN: u32 = 12;

/// Decimal places kept for boxes and dozens
pub const QUANTITY_DECIMAL_PLACES: u32 = 2;

/// Rounds a quantity to two decimal places, midpoint away from zero
///
/// # Example
///
/// ```rust
/// use core_kernel::round_quantity;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_quantity(dec!(8.335)), dec!(8.34));
/// ```
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Planned boxes for a number of dozens: `round(dozens * 12 / packing_mode, 2)`
///
/// # Arguments
///
/// * `dozens` - Planned dozens
/// * `packing_mode` - Pieces per box for the item (must be non-zero)
///
/// # Returns
///
/// `None` if `packing_mode` is zero
pub fn boxes_for_dozens(dozens: u32, packing_mode: u32) -> Option<Decimal> {
    if packing_mode == 0 {
        return None;
    }
    let pieces = Decimal::from(dozens) * Decimal::from(PIECES_PER_DOZEN);
    Some(round_quantity(pieces / Decimal::from(packing_mode)))
}

/// Dozens represented by a number of boxes: `round(boxes * packing_mode / 12, 2)`
pub fn dozens_for_boxes(boxes: Decimal, packing_mode: u32) -> Decimal {
    round_quantity(boxes * Decimal::from(packing_mode) / Decimal::from(PIECES_PER_DOZEN))
}
