//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the delivery ledger, built on SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories are stateless and
//! borrow a connection, so the adapter can compose several of them inside one
//! transaction. `PostgresDeliveryStore` implements the domain `DeliveryStore`
//! port on top of them and owns the locking that keeps accepted deliveries
//! within their planned boxes.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresDeliveryStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/delivery_ledger")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresDeliveryStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::PostgresDeliveryStore;
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
