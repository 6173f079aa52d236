//! Content loaders for reading catalog data from files.
//!
//! RON files hold authored records with snake_case fields and plain string
//! enum tags; loaders resolve them into `quest-core` types. TOML holds the
//! starting economy and board size.

pub mod catalog;
pub mod config;
pub mod factory;
pub mod records;

pub use catalog::{Catalog, CatalogLoader, CatalogSources, UpgradeTrack};
pub use config::{ConfigLoader, EconomySection, GameSection, GridSection, StartingConfig};
pub use factory::ContentFactory;

use std::path::Path;
use std::str::FromStr;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Parses a string enum tag, naming the field and offending value on failure.
pub(crate) fn parse_tag<T: FromStr>(field: &str, value: &str) -> LoadResult<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown {} '{}'", field, value))
}
