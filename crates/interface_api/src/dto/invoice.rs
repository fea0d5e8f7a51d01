//! Invoice DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::InvoiceNumber;
use domain_delivery::InvoiceBinding;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceBody {
    #[validate(length(min = 1, max = 64, message = "invoice_number must be 1-64 characters"))]
    pub invoice_number: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Query string for `/statistics`
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct InvoiceSummaryResponse {
    pub invoice_number: InvoiceNumber,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<InvoiceBinding> for InvoiceSummaryResponse {
    fn from(binding: InvoiceBinding) -> Self {
        Self {
            invoice_number: binding.number,
            from_date: binding.range.from(),
            to_date: binding.range.to(),
            created_at: binding.created_at,
        }
    }
}
