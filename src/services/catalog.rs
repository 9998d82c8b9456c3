use crate::models::ProductCriteria;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when reading a catalog snapshot from disk
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to open catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a JSON catalog snapshot and keep the products offered for `product_type`
///
/// Entries without a product type are kept; catalog order is preserved.
pub fn load_catalog_file(
    path: &Path,
    product_type: &str,
) -> Result<Vec<ProductCriteria>, CatalogError> {
    let shown = path.display().to_string();
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: shown.clone(),
        source,
    })?;

    let products: Vec<ProductCriteria> = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| CatalogError::Parse { path: shown, source })?;

    let total = products.len();
    let offered: Vec<ProductCriteria> = products
        .into_iter()
        .filter(|p| p.product_type.as_deref().map_or(true, |t| t == product_type))
        .collect();

    tracing::debug!(
        "Catalog {} has {} of {} products of type {}",
        path.display(),
        offered.len(),
        total,
        product_type
    );

    Ok(offered)
}
