//! Invoice aggregation
//!
//! Invoices are live views. Creating one stores the number and date range;
//! reading one prices whatever deliveries fall in that range at read time.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use core_kernel::{DateRange, InvoiceNumber};
use domain_catalog::PricingCatalog;

use crate::error::DeliveryError;
use crate::invoice::{InvoiceBinding, InvoiceStatement};
use crate::ports::DeliveryStore;
use crate::status::RangeStatistics;

/// Service for raising and reading invoices
#[derive(Clone)]
pub struct InvoiceAggregator {
    store: Arc<dyn DeliveryStore>,
    catalog: Arc<PricingCatalog>,
}

impl InvoiceAggregator {
    pub fn new(store: Arc<dyn DeliveryStore>, catalog: Arc<PricingCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Binds a date range to an invoice number
    ///
    /// # Errors
    ///
    /// - `InvalidRange` if `from` is after `to`
    /// - `DuplicateInvoice` if the number already exists
    #[instrument(skip(self), fields(invoice_number = %number))]
    pub async fn create_invoice(
        &self,
        number: InvoiceNumber,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<InvoiceBinding, DeliveryError> {
        let range = DateRange::new(from, to)?;
        let binding = self
            .store
            .insert_invoice(InvoiceBinding::new(number, range))
            .await?;
        info!(from = %range.from(), to = %range.to(), "Invoice created");
        Ok(binding)
    }

    /// Prices every delivery in the invoice's range as it stands now
    ///
    /// # Errors
    ///
    /// - `NotFound` if no such invoice exists
    /// - `UnknownItem` if a delivered item is no longer in the catalog
    #[instrument(skip(self), fields(invoice_number = %number))]
    pub async fn get_invoice(
        &self,
        number: &InvoiceNumber,
    ) -> Result<InvoiceStatement, DeliveryError> {
        let (binding, deliveries) = self
            .store
            .invoice_with_deliveries(number)
            .await?;
        let statement = InvoiceStatement::build(&binding, deliveries, &self.catalog)?;
        debug!(
            lines = statement.lines.len(),
            total = %statement.total,
            "Built invoice statement"
        );
        Ok(statement)
    }

    /// Every invoice, newest number first
    pub async fn list_invoices(&self) -> Result<Vec<InvoiceBinding>, DeliveryError> {
        self.store.list_invoices().await
    }

    /// Totals and challan completion for deliveries in a date range
    #[instrument(skip(self))]
    pub async fn range_statistics(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<RangeStatistics, DeliveryError> {
        let range = DateRange::new(from, to)?;
        let deliveries = self.store.deliveries_between(range).await?;
        let pending = self.store.pending_items().await?;
        RangeStatistics::compute(range, &deliveries, &pending, &self.catalog)
    }
}
