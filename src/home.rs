//! Sapling home resolution.
//!
//! The home directory holds `config.toml` and the `paths/` store. It is
//! resolved through a chain:
//!
//! 1. `--home <dir>`, an explicit per-command override
//! 2. `SAPLING_HOME` env var
//! 3. `~/.sapling`

use std::env;
use std::path::{Path, PathBuf};

/// Error message shown when no home directory can be found.
pub const HOME_REQUIRED: &str =
    "could not determine home directory: pass --home <dir> or set SAPLING_HOME";

/// Resolve the sapling home from the tiered resolution chain.
pub fn resolve_home(explicit: Option<&Path>) -> Result<PathBuf, String> {
    // 1. Explicit --home flag.
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    // 2. SAPLING_HOME environment variable.
    if let Ok(dir) = env::var("SAPLING_HOME")
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    // 3. ~/.sapling.
    dirs::home_dir()
        .map(|h| h.join(".sapling"))
        .ok_or_else(|| HOME_REQUIRED.to_string())
}

/// Where learning path files live under a home directory.
pub fn paths_dir(home: &Path) -> PathBuf {
    home.join("paths")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_wins() {
        // An explicit home is returned without consulting env or filesystem.
        let result = resolve_home(Some(Path::new("/tmp/sapling-test")));
        assert_eq!(result.unwrap(), PathBuf::from("/tmp/sapling-test"));
    }

    #[test]
    fn paths_live_under_home() {
        assert_eq!(
            paths_dir(Path::new("/srv/sapling")),
            PathBuf::from("/srv/sapling/paths")
        );
    }
}
