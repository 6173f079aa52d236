//! Starting configuration loader.

use std::path::Path;

use quest_core::{EconomyState, GameConfig, GridState};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSection {
    pub rows: i32,
    pub columns: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySection {
    pub credits: u64,
    pub token_budget: u64,
    pub tool_budget: u64,
    pub tool_cost: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSection {
    pub target_score: f64,
    pub max_ticks: u32,
    pub score_per_tool: f64,
}

/// Board size, economy and scoring rules for a fresh session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartingConfig {
    pub grid: GridSection,
    pub economy: EconomySection,
    pub game: GameSection,
}

impl StartingConfig {
    pub fn grid_state(&self) -> GridState {
        GridState::new(self.grid.rows, self.grid.columns)
    }

    pub fn economy_state(&self) -> EconomyState {
        EconomyState {
            credits: self.economy.credits,
            token_budget: self.economy.token_budget,
            tool_budget: self.economy.tool_budget,
            tool_cost: self.economy.tool_cost,
        }
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            target_score: self.game.target_score,
            max_ticks: self.game.max_ticks,
            score_per_tool: self.game.score_per_tool,
        }
    }
}

/// Loader for the starting configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    pub const CONFIG_FILE: &'static str = "config.toml";

    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<StartingConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<StartingConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}
