//! Path resolution for chemviz configuration files.
//!
//! ```text
//! ~/.config/chemviz/           # Config directory (platform default)
//! └── config.toml              # Optional client configuration
//! ```

use std::path::PathBuf;

use chemviz_core::error::{ChemvizError, Result};

const APP_DIR: &str = "chemviz";
const CONFIG_FILE: &str = "config.toml";

/// Unified path management for chemviz.
pub struct ChemvizPaths;

impl ChemvizPaths {
    /// Returns the chemviz configuration directory (e.g. `~/.config/chemviz/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ChemvizError::config("Cannot find configuration directory"))
    }

    /// Returns the path of `config.toml`. The file may not exist.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}
