//! Platform-specific directories.

use std::path::PathBuf;

/// Default save data directory.
///
/// Follows platform conventions:
/// - macOS: `~/Library/Application Support/contextquest`
/// - Linux: `~/.local/share/contextquest` (or `$XDG_DATA_HOME/contextquest`)
/// - Windows: `%APPDATA%\contextquest`
/// - Fallback: `./save_data`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "contextquest")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}
