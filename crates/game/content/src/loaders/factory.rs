//! Content factory for building the starting state from data files.

use std::path::{Path, PathBuf};

use quest_core::{EngineState, RunState};

use crate::loaders::{
    Catalog, CatalogLoader, CatalogSources, ConfigLoader, LoadResult, StartingConfig,
};

const BUILTIN_CONFIG: &str = include_str!("../../data/config.toml");
const BUILTIN_SOURCES: CatalogSources<'static> = CatalogSources {
    tickets: include_str!("../../data/tickets.ron"),
    models: include_str!("../../data/models.ron"),
    tools: include_str!("../../data/tools.ron"),
    blocks: include_str!("../../data/blocks.ron"),
    upgrades: include_str!("../../data/upgrades.ron"),
    variants: include_str!("../../data/variants.ron"),
};

/// Where content is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ContentSource {
    /// Data files embedded at compile time.
    Builtin,
    Dir(PathBuf),
}

/// Content factory that loads catalog and starting config.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── tickets.ron
/// ├── models.ron
/// ├── tools.ron
/// ├── blocks.ron
/// ├── upgrades.ron
/// └── variants.ron
/// ```
#[derive(Debug, Clone)]
pub struct ContentFactory {
    source: ContentSource,
}

impl ContentFactory {
    /// Factory over the content shipped with this crate.
    pub fn builtin() -> Self {
        Self {
            source: ContentSource::Builtin,
        }
    }

    /// Factory over a data directory with the layout above.
    pub fn from_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: ContentSource::Dir(data_dir.into()),
        }
    }

    /// Returns the data directory path, or `None` for builtin content.
    pub fn data_dir(&self) -> Option<&Path> {
        match &self.source {
            ContentSource::Builtin => None,
            ContentSource::Dir(dir) => Some(dir),
        }
    }

    /// Load the starting configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<StartingConfig> {
        match &self.source {
            ContentSource::Builtin => ConfigLoader::parse(BUILTIN_CONFIG),
            ContentSource::Dir(dir) => ConfigLoader::load(&dir.join(ConfigLoader::CONFIG_FILE)),
        }
    }

    /// Load and resolve the catalog RON files.
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        match &self.source {
            ContentSource::Builtin => CatalogLoader::parse(BUILTIN_SOURCES),
            ContentSource::Dir(dir) => CatalogLoader::load(dir),
        }
    }

    /// Builds the state a new session starts from.
    pub fn initial_state(&self) -> LoadResult<EngineState> {
        let catalog = self.load_catalog()?;
        let config = self.load_config()?;
        Ok(initial_state(&catalog, &config))
    }
}

/// Assembles a fresh state: idle run, first model and first ticket selected.
pub fn initial_state(catalog: &Catalog, config: &StartingConfig) -> EngineState {
    EngineState {
        tickets: catalog.tickets.clone(),
        grid: config.grid_state(),
        blocks: catalog.blocks.clone(),
        models: catalog.models.clone(),
        model: catalog.models.first().cloned(),
        tools: catalog.tools.clone(),
        upgrades: catalog.upgrade_catalog(),
        owned_upgrades: Vec::new(),
        economy: config.economy_state(),
        game_config: config.game_config(),
        run_state: RunState::default(),
        event_counter: 0,
        selected_ticket_id: catalog.tickets.first().map(|ticket| ticket.id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::from_dir("/tmp/data");
        assert_eq!(factory.data_dir(), Some(Path::new("/tmp/data")));
        assert_eq!(ContentFactory::builtin().data_dir(), None);
    }

    #[test]
    fn missing_directory_reports_file() {
        let err = ContentFactory::from_dir("/nonexistent/quest-data")
            .load_config()
            .unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
