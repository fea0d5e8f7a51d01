//! Wiring of the three services over one shared store

use std::sync::Arc;

use core_kernel::HealthCheckResult;
use domain_catalog::PricingCatalog;

use crate::aggregator::InvoiceAggregator;
use crate::ledger::DeliveryLedger;
use crate::ports::DeliveryStore;
use crate::registry::DcRegistry;

/// Registry, ledger and aggregator sharing one store and one catalog
#[derive(Clone)]
pub struct DeliveryEngine {
    pub registry: DcRegistry,
    pub ledger: DeliveryLedger,
    pub aggregator: InvoiceAggregator,
    store: Arc<dyn DeliveryStore>,
    catalog: Arc<PricingCatalog>,
}

impl DeliveryEngine {
    pub fn new(store: Arc<dyn DeliveryStore>, catalog: Arc<PricingCatalog>) -> Self {
        Self {
            registry: DcRegistry::new(store.clone(), catalog.clone()),
            ledger: DeliveryLedger::new(store.clone()),
            aggregator: InvoiceAggregator::new(store.clone(), catalog.clone()),
            store,
            catalog,
        }
    }

    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }

    /// Health of the backing store
    pub async fn health_check(&self) -> HealthCheckResult {
        self.store.health_check().await
    }
}
