//! # modpatch-core
//!
//! A library for inspecting game executables and installing a mod-loader proxy.
//!
//! This crate provides the core functionality for:
//! - Locating the target executable in an installation directory
//! - Classifying executables as 32- or 64-bit from the PE header
//! - Detecting the managed framework version a target assembly was built
//!   against, from its metadata tables
//! - Installing the architecture-appropriate proxy artifact and a default
//!   configuration, from an embedded resource registry
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`locate`]: Target executable discovery
//! - [`pe`]: PE/COFF header inspection
//! - [`metadata`]: Managed-assembly metadata inspection
//! - [`install`]: Resource registry, proxy and configuration installation
//! - [`config`]: Ini-backed settings reader
//! - [`paths`]: Placeholder path resolution
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use modpatch_core::{find_target_executable, inspect_architecture_at, detect_framework};
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! if let Some(game) = find_target_executable(root, "modpatch")? {
//!     let arch = inspect_architecture_at(&game)?;
//!     println!("{}: {arch}", game.display());
//!     println!("framework: {}", detect_framework(&game));
//! }
//! # Ok::<(), modpatch_core::Error>(())
//! ```
//!
//! All inspections are read-only and tolerate the target being open
//! elsewhere. Installation writes are exclusive and always overwrite.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

mod bytes;

pub mod config;
pub mod error;
pub mod install;
pub mod locate;
pub mod metadata;
pub mod paths;
pub mod pe;

// Re-export primary types for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use install::{
    install_proxy, provision_config, proxy_resource_key, ResourceSet, CONFIG_FILE_NAME,
    CONFIG_RESOURCE_KEY, PROXY_FILE_NAME,
};
pub use locate::find_target_executable;
pub use metadata::{detect_framework, DetectionStrategy, FrameworkReport};
pub use paths::PathResolver;
pub use pe::{inspect_architecture, inspect_architecture_at, Architecture};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
