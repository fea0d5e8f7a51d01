//! Challan registry
//!
//! Owns challans and their planned rows. Planned boxes are always derived
//! from dozens through the catalog here, before anything reaches the store.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use core_kernel::{DcNumber, ItemName};
use domain_catalog::PricingCatalog;

use crate::challan::{CreateChallanRequest, DcEntry, DcRow, DcSummary};
use crate::error::DeliveryError;
use crate::ports::DeliveryStore;

/// Service for creating, reading and deleting challans
#[derive(Clone)]
pub struct DcRegistry {
    store: Arc<dyn DeliveryStore>,
    catalog: Arc<PricingCatalog>,
}

impl DcRegistry {
    pub fn new(store: Arc<dyn DeliveryStore>, catalog: Arc<PricingCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Creates a challan with all of its planned rows
    ///
    /// # Errors
    ///
    /// - `DuplicateEntry` if the number already exists
    /// - `UnknownItem` if a line names an item outside the catalog
    /// - `Validation` for an empty line list, a repeated item or zero dozens
    #[instrument(
        skip(self, request),
        fields(dc_number = %request.dc_number, lines = request.lines.len())
    )]
    pub async fn create(&self, request: CreateChallanRequest) -> Result<DcEntry, DeliveryError> {
        let entry = request.into_entry(&self.catalog, Utc::now())?;
        let entry = self.store.insert_challan(entry).await?;
        info!(planned_boxes = %entry.planned_boxes(), "Challan created");
        Ok(entry)
    }

    #[instrument(skip(self), fields(dc_number = %dc_number))]
    pub async fn fetch(&self, dc_number: &DcNumber) -> Result<DcEntry, DeliveryError> {
        let entry = self.store.get_challan(dc_number).await?;
        debug!(rows = entry.rows.len(), "Fetched challan");
        Ok(entry)
    }

    pub async fn list(&self) -> Result<Vec<DcSummary>, DeliveryError> {
        self.store.list_challans().await
    }

    /// Re-plans a row: recomputes boxes from `dozens` and overwrites it
    ///
    /// # Errors
    ///
    /// - `NotFound` if the challan has no row for the item
    /// - `OverDelivery` if more boxes were already delivered than the new plan allows
    #[instrument(skip(self), fields(dc_number = %dc_number, item = %item))]
    pub async fn update_row(
        &self,
        dc_number: &DcNumber,
        item: &ItemName,
        dozens: u32,
    ) -> Result<DcRow, DeliveryError> {
        let row = DcRow::planned(&self.catalog, item.clone(), dozens)?;
        match self.store.update_planned_row(dc_number, row).await {
            Ok(row) => {
                info!(dozens = row.dozens, boxes = %row.boxes, "Challan row re-planned");
                Ok(row)
            }
            Err(err @ DeliveryError::OverDelivery { .. }) => {
                warn!(error = %err, "Re-plan rejected");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Removes a row together with its deliveries
    #[instrument(skip(self), fields(dc_number = %dc_number, item = %item))]
    pub async fn delete_row(
        &self,
        dc_number: &DcNumber,
        item: &ItemName,
    ) -> Result<(), DeliveryError> {
        let removed = self.store.delete_row(dc_number, item).await?;
        info!(deliveries_removed = removed, "Challan row deleted");
        Ok(())
    }

    /// Removes a challan together with its rows and deliveries
    #[instrument(skip(self), fields(dc_number = %dc_number))]
    pub async fn delete_entry(&self, dc_number: &DcNumber) -> Result<(), DeliveryError> {
        let removed = self.store.delete_challan(dc_number).await?;
        info!(deliveries_removed = removed, "Challan deleted");
        Ok(())
    }
}
