//! Proxy and configuration installation.
//!
//! Artifacts are bundled into the patcher at build time and exposed through
//! an explicit [`ResourceSet`] registry keyed by string. Installation is a
//! pure resource-to-file copy: the proxy goes to a fixed name in the
//! installation root, the configuration template to the game's data
//! directory, both always overwriting. Re-running the patcher deliberately
//! discards prior edits so it always hands off a known-good baseline.

use crate::error::{Error, Result};
use crate::pe::Architecture;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the installed proxy library
pub const PROXY_FILE_NAME: &str = "version.dll";

/// File name of the provisioned configuration
pub const CONFIG_FILE_NAME: &str = "modpatch.ini";

/// Registry key of the default configuration template
pub const CONFIG_RESOURCE_KEY: &str = "config/default.ini";

/// Registry key of the proxy artifact for the given architecture
pub fn proxy_resource_key(arch: Architecture) -> &'static str {
    match arch {
        Architecture::X86 => "proxy/x86/version.dll",
        Architecture::X64 => "proxy/x64/version.dll",
    }
}

/// Registry of embedded resources, keyed by string identifier.
///
/// The binary registers its `include_bytes!` blobs here at startup; lookups
/// of unregistered keys are a fatal configuration error, since the proxy is
/// the mechanism that makes the target load the mod loader at all.
#[derive(Debug, Default)]
pub struct ResourceSet {
    entries: HashMap<&'static str, Cow<'static, [u8]>>,
}

impl ResourceSet {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource under `key`, replacing any previous entry
    pub fn insert(&mut self, key: &'static str, bytes: impl Into<Cow<'static, [u8]>>) {
        self.entries.insert(key, bytes.into());
    }

    /// Returns the bytes registered under `key`
    pub fn get(&self, key: &str) -> Result<&[u8]> {
        self.entries
            .get(key)
            .map(|b| b.as_ref())
            .ok_or_else(|| Error::resource_not_found(key))
    }
}

/// Installs the architecture-appropriate proxy into `install_root`.
///
/// Writes the resource bytes verbatim to `{install_root}/version.dll` with
/// exclusive write access, overwriting any existing file. Returns the path of
/// the installed artifact.
pub fn install_proxy(
    resources: &ResourceSet,
    arch: Architecture,
    install_root: &Path,
) -> Result<PathBuf> {
    let key = proxy_resource_key(arch);
    let bytes = resources.get(key)?;
    let target = install_root.join(PROXY_FILE_NAME);

    debug!("Extracting proxy resource '{key}' ({} bytes)", bytes.len());
    std::fs::write(&target, bytes).map_err(|e| Error::file_write(&target, e))?;

    info!(
        "Installed proxy '{PROXY_FILE_NAME}' to {} (blake3 {})",
        target.display(),
        content_hash(bytes)
    );
    Ok(target)
}

/// Copies the default configuration template to `config_path`.
///
/// Creates parent directories as needed and always overwrites: provisioning
/// is idempotent and resets any manual edits to the template baseline.
pub fn provision_config(resources: &ResourceSet, config_path: &Path) -> Result<()> {
    let template = resources.get(CONFIG_RESOURCE_KEY)?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::directory_create(parent, e))?;
    }
    std::fs::write(config_path, template).map_err(|e| Error::file_write(config_path, e))?;

    info!("Provisioned configuration at {}", config_path.display());
    Ok(())
}

/// Short content hash for log output (first 8 hex chars of blake3)
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex()[..8].to_string()
}
