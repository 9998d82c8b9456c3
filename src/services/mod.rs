// Service exports
pub mod catalog;
pub mod postgres;

pub use catalog::{load_catalog_file, CatalogError};
pub use postgres::{PostgresClient, PostgresError};
