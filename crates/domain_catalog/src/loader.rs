//! Loading the catalog from a configuration file
//!
//! The catalog file can be TOML, YAML or JSON (anything the `config` crate
//! recognises by extension):
//!
//! ```toml
//! currency = "INR"
//! box_label = "Boxes"
//!
//! [[items]]
//! name = "Shirt"
//! packing_mode = 6
//! rate_per_dozen = "100.00"
//! ```

use std::path::Path;

use config::{Config, File, FileFormat};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use core_kernel::{Currency, ItemName};

use crate::catalog::{CatalogItem, PricingCatalog};
use crate::error::CatalogError;

/// On-disk catalog layout
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub box_label: Option<String>,
    pub items: Vec<CatalogFileItem>,
}

/// One item row in the catalog file
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFileItem {
    pub name: ItemName,
    pub packing_mode: u32,
    pub rate_per_dozen: Decimal,
}

impl TryFrom<CatalogFile> for PricingCatalog {
    type Error = CatalogError;

    fn try_from(file: CatalogFile) -> Result<Self, Self::Error> {
        let items = file
            .items
            .into_iter()
            .map(|item| CatalogItem::new(item.name, item.packing_mode, item.rate_per_dozen))
            .collect();

        let catalog = PricingCatalog::new(file.currency, items)?;
        Ok(match file.box_label {
            Some(label) => catalog.with_box_label(label),
            None => catalog,
        })
    }
}

impl PricingCatalog {
    /// Loads and validates a catalog file
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Load` if the file cannot be read or parsed, or
    /// any validation error from [`PricingCatalog::new`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file: CatalogFile = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        let catalog = PricingCatalog::try_from(file)?;
        info!(
            path = %path.display(),
            items = catalog.items().len(),
            currency = %catalog.currency(),
            "Loaded pricing catalog"
        );
        Ok(catalog)
    }

    /// Parses a catalog from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        PricingCatalog::try_from(file)
    }
}
