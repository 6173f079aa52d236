//! Runtime configuration read from the environment.
use std::env;
use std::path::PathBuf;

use crate::dirs;
use crate::session::{DEFAULT_SEED, SessionOptions};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Directory holding `save_slots.json`.
    pub save_data_dir: PathBuf,
    pub seed: String,
    pub auto_complete: bool,
    pub stamp_timestamps: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            save_data_dir: dirs::data_dir(),
            seed: DEFAULT_SEED.to_string(),
            auto_complete: false,
            stamp_timestamps: false,
        }
    }
}

impl RuntimeConfig {
    /// Construct runtime configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SAVE_DATA_DIR` - save slot directory (default: platform data dir)
    /// - `QUEST_SEED` - player seed (default: `contextquest`)
    /// - `QUEST_AUTO_COMPLETE` - `true` to end finished runs automatically
    /// - `QUEST_STAMP_TIMESTAMPS` - `true` to stamp actions with the wall clock
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("SAVE_DATA_DIR") {
            config.save_data_dir = dir;
        }
        if let Some(seed) = read_env::<String>("QUEST_SEED").filter(|seed| !seed.is_empty()) {
            config.seed = seed;
        }
        if let Some(auto_complete) = read_env::<bool>("QUEST_AUTO_COMPLETE") {
            config.auto_complete = auto_complete;
        }
        if let Some(stamp) = read_env::<bool>("QUEST_STAMP_TIMESTAMPS") {
            config.stamp_timestamps = stamp;
        }

        config
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            seed: self.seed.clone(),
            stamp_timestamps: self.stamp_timestamps,
            auto_complete: self.auto_complete,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
