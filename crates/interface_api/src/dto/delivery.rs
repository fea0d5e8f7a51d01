//! Delivery DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use core_kernel::{DcNumber, ItemName};
use domain_delivery::{DeliveryChange, RecordDeliveryRequest};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct RecordDeliveryBody {
    #[validate(length(min = 1, max = 128))]
    pub item: String,
    pub date: NaiveDate,
    pub boxes: Decimal,
}

impl RecordDeliveryBody {
    pub fn into_request(self, dc_number: DcNumber) -> Result<RecordDeliveryRequest, ApiError> {
        Ok(RecordDeliveryRequest {
            dc_number,
            item: ItemName::parse(&self.item)?,
            date: self.date,
            boxes: self.boxes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryBody {
    pub boxes: Decimal,
    pub date: Option<NaiveDate>,
}

impl From<UpdateDeliveryBody> for DeliveryChange {
    fn from(body: UpdateDeliveryBody) -> Self {
        DeliveryChange {
            boxes: body.boxes,
            date: body.date,
        }
    }
}
