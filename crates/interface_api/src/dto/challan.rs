//! Challan DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{DcNumber, ItemName};
use domain_catalog::PricingCatalog;
use domain_delivery::{CreateChallanRequest, DcEntry, PlannedLine};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChallanBody {
    #[validate(length(min = 1, max = 64, message = "dc_number must be 1-64 characters"))]
    pub dc_number: String,
    #[validate(length(min = 1, message = "a challan needs at least one item"), nested)]
    pub items: Vec<PlannedLineBody>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PlannedLineBody {
    #[validate(length(min = 1, max = 128))]
    pub item: String,
    #[validate(range(min = 1, message = "dozens must be positive"))]
    pub dozens: u32,
}

impl CreateChallanBody {
    pub fn into_request(self) -> Result<CreateChallanRequest, ApiError> {
        let lines = self
            .items
            .into_iter()
            .map(|line| {
                Ok(PlannedLine {
                    item: ItemName::parse(&line.item)?,
                    dozens: line.dozens,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok(CreateChallanRequest {
            dc_number: DcNumber::parse(&self.dc_number)?,
            lines,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRowBody {
    #[validate(range(min = 1, message = "dozens must be positive"))]
    pub dozens: u32,
}

#[derive(Debug, Serialize)]
pub struct ChallanRowResponse {
    pub item: ItemName,
    pub dozens: u32,
    pub boxes: Decimal,
    pub box_label: String,
}

#[derive(Debug, Serialize)]
pub struct ChallanResponse {
    pub dc_number: DcNumber,
    pub created_at: DateTime<Utc>,
    pub rows: Vec<ChallanRowResponse>,
    pub planned_boxes: Decimal,
}

impl ChallanResponse {
    pub fn from_entry(entry: DcEntry, catalog: &PricingCatalog) -> Self {
        let planned_boxes = entry.planned_boxes();
        let box_label = catalog.box_label().to_string();
        Self {
            dc_number: entry.dc_number,
            created_at: entry.created_at,
            rows: entry
                .rows
                .into_iter()
                .map(|row| ChallanRowResponse {
                    item: row.item,
                    dozens: row.dozens,
                    boxes: row.boxes,
                    box_label: box_label.clone(),
                })
                .collect(),
            planned_boxes,
        }
    }
}
