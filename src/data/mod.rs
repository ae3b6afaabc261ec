//! Data module - CSV loading and cleaning

pub mod cleaner;
pub mod columns;
pub mod interpolate;
pub mod loader;

pub use cleaner::{CleanerError, DataCleaner};
pub use loader::{DataLoader, DatasetSummary, LoaderError};
