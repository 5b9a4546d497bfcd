//! Locating the target executable in the installation root.
//!
//! The patcher is dropped into the game's installation directory next to the
//! game executable. The locator returns the first `.exe` whose base name is
//! not the patcher's own, in directory-enumeration order. Multiple candidates
//! are not disambiguated further; the first match wins.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Finds the target executable in `dir`, excluding the invoking tool itself.
///
/// `own_name` is the tool's own base name (no extension); the comparison
/// against candidate base names is case-insensitive, as is the `.exe`
/// extension check. Returns `Ok(None)` when no candidate exists; the caller
/// decides whether that is fatal.
pub fn find_target_executable(dir: &Path, own_name: &str) -> Result<Option<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::directory_read(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::directory_read(dir, e))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_exe = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("exe"))
            .unwrap_or(false);
        if !is_exe {
            trace!("Skipping non-executable: {}", path.display());
            continue;
        }

        let is_self = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.eq_ignore_ascii_case(own_name))
            .unwrap_or(false);
        if is_self {
            trace!("Skipping our own executable: {}", path.display());
            continue;
        }

        debug!("Target executable candidate: {}", path.display());
        return Ok(Some(path));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finds_game_excluding_self() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Patcher.exe"), b"self").unwrap();
        fs::write(dir.path().join("Game.exe"), b"game").unwrap();

        let found = find_target_executable(dir.path(), "Patcher")
            .unwrap()
            .expect("game executable should be found");
        assert_eq!(found.file_name().unwrap(), "Game.exe");
    }

    #[test]
    fn test_own_name_comparison_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("PATCHER.EXE"), b"self").unwrap();

        let found = find_target_executable(dir.path(), "patcher").unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_no_candidates_is_none_not_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.txt"), b"hi").unwrap();

        assert!(find_target_executable(dir.path(), "Patcher")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("nope");
        assert!(find_target_executable(&gone, "Patcher").is_err());
    }
}
