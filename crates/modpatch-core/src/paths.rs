//! Placeholder path resolution.
//!
//! Configuration values addressed to the mod loader may contain `{Name}` and
//! `{Data}` placeholders so one template works for every game. The resolver
//! expands them against the discovered installation and anchors relative
//! paths under the installation root. Absolute paths pass through untouched.

use std::path::{Path, PathBuf};

/// Expands placeholder paths against a concrete installation
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    game_name: String,
    data_folder: String,
}

impl PathResolver {
    /// Creates a resolver for the installation at `root`.
    ///
    /// `game_name` is the target executable's base name, `data_folder` the
    /// name of its data directory.
    pub fn new(
        root: impl Into<PathBuf>,
        game_name: impl Into<String>,
        data_folder: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            game_name: game_name.into(),
            data_folder: data_folder.into(),
        }
    }

    /// Resolves a raw path from configuration to an absolute path
    pub fn resolve(&self, raw: &str) -> PathBuf {
        if Path::new(raw).is_absolute() {
            return PathBuf::from(raw);
        }
        let expanded = raw
            .replace("{Name}", &self.game_name)
            .replace("{Data}", &self.data_folder);
        self.root.join(expanded)
    }
}
