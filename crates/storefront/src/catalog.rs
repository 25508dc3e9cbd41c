//! Catalog loading.
//!
//! The built-in catalog ships inside the binary from `content/catalog.json`;
//! `REPX_CATALOG_PATH` swaps in another file with the same shape.

use std::path::Path;

use repx_core::{Catalog, CatalogError};

/// Catalog compiled into the binary.
pub const BUILTIN_CATALOG: &str = include_str!("../content/catalog.json");

/// Errors loading the catalog at startup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

/// Load the catalog from `path`, or the built-in one when `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, CatalogLoadError> {
    let catalog = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Catalog::from_json(&json)?
        }
        None => Catalog::from_json(BUILTIN_CATALOG)?,
    };
    tracing::info!(products = catalog.len(), "Catalog loaded");
    Ok(catalog)
}
