//! Data-driven catalog content and loaders.
//!
//! This crate houses the static content a ContextQuest session starts from:
//! - Tickets, models and tools (RON)
//! - Seed context blocks (RON)
//! - Upgrade tracks and per-ticket variants (RON)
//! - Starting grid size, economy and scoring rules (TOML)
//!
//! The builtin data set is embedded at compile time. [`ContentFactory::from_dir`]
//! reads the same file layout from disk instead.

pub mod loaders;

pub use loaders::factory::initial_state;
pub use loaders::{
    Catalog, CatalogLoader, CatalogSources, ConfigLoader, ContentFactory, LoadResult,
    StartingConfig, UpgradeTrack,
};
