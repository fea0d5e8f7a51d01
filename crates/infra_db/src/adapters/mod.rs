//! Domain Adapters
//!
//! PostgreSQL implementations of domain ports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresDeliveryStore;
//! use domain_delivery::DeliveryStore;
//!
//! let store: Arc<dyn DeliveryStore> = Arc::new(PostgresDeliveryStore::new(pool));
//! let entry = store.get_challan(&dc_number).await?;
//! ```

pub mod delivery_store;

pub use delivery_store::PostgresDeliveryStore;
