//! Sapling configuration.
//!
//! Loaded from `<home>/config.toml`. A missing file means defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout::LayoutPolicy;

/// Sapling configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Move the focus to the next open chapter after each completion.
    pub auto_advance: bool,

    /// Geometry for `layout` output.
    pub layout: LayoutPolicy,
}

impl Config {
    /// Load config from `<home>/config.toml`.
    /// Returns defaults if the file is missing, an error if it is invalid.
    pub fn load(home: &Path) -> Result<Self, String> {
        let path = Self::path(home);

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `<home>/config.toml`.
    pub fn path(home: &Path) -> PathBuf {
        home.join("config.toml")
    }
}
