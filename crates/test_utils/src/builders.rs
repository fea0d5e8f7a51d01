//! Test Data Builders
//!
//! Builders for ledger requests with sensible defaults, so tests only spell
//! out the fields they care about.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{DcNumber, ItemName};
use domain_delivery::{CreateChallanRequest, DeliveryChange, PlannedLine, RecordDeliveryRequest};

use crate::fixtures::{CodeFixtures, DateFixtures};

/// Builder for challan requests
///
/// Defaults to `DC001` with no lines.
pub struct TestChallanBuilder {
    dc_number: DcNumber,
    lines: Vec<PlannedLine>,
}

impl Default for TestChallanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestChallanBuilder {
    pub fn new() -> Self {
        Self {
            dc_number: CodeFixtures::dc("DC001"),
            lines: Vec::new(),
        }
    }

    pub fn with_dc_number(mut self, number: &str) -> Self {
        self.dc_number = CodeFixtures::dc(number);
        self
    }

    /// Adds a planned line
    pub fn with_line(mut self, item: &str, dozens: u32) -> Self {
        self.lines.push(PlannedLine {
            item: CodeFixtures::item(item),
            dozens,
        });
        self
    }

    /// `DC001` planning A for 5 dozen (10 boxes) and B for 7 dozen (8.40 boxes)
    pub fn standard() -> Self {
        Self::new().with_line("A", 5).with_line("B", 7)
    }

    pub fn build(self) -> CreateChallanRequest {
        CreateChallanRequest {
            dc_number: self.dc_number,
            lines: self.lines,
        }
    }
}

/// Builder for delivery requests
///
/// Defaults to one box of `A` on `DC001`, dated 2024-01-05.
pub struct TestDeliveryBuilder {
    dc_number: DcNumber,
    item: ItemName,
    date: NaiveDate,
    boxes: Decimal,
}

impl Default for TestDeliveryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDeliveryBuilder {
    pub fn new() -> Self {
        Self {
            dc_number: CodeFixtures::dc("DC001"),
            item: CodeFixtures::item("A"),
            date: DateFixtures::jan(5),
            boxes: dec!(1),
        }
    }

    pub fn with_dc_number(mut self, number: &str) -> Self {
        self.dc_number = CodeFixtures::dc(number);
        self
    }

    pub fn with_item(mut self, item: &str) -> Self {
        self.item = CodeFixtures::item(item);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn with_boxes(mut self, boxes: Decimal) -> Self {
        self.boxes = boxes;
        self
    }

    pub fn build(self) -> RecordDeliveryRequest {
        RecordDeliveryRequest {
            dc_number: self.dc_number,
            item: self.item,
            date: self.date,
            boxes: self.boxes,
        }
    }
}

/// A correction that keeps the delivery date
pub fn change_boxes(boxes: Decimal) -> DeliveryChange {
    DeliveryChange { boxes, date: None }
}
