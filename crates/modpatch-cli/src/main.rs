//! modpatch - install the mod-loader proxy into a game installation
//!
//! This tool detects the game executable in the installation root, classifies
//! its architecture, determines the framework version its core assembly was
//! built against, provisions a default configuration and installs the
//! architecture-appropriate proxy library.

use anyhow::{Context, Result};
use clap::Parser;
use modpatch_core::{
    detect_framework, find_target_executable, inspect_architecture_at, install,
    install_proxy, provision_config, Architecture, Config, Error, FrameworkReport,
    PathResolver, ResourceSet, CONFIG_FILE_NAME, CONFIG_RESOURCE_KEY,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Assembly inspected for the target framework version
const CORE_ASSEMBLY: &str = "Assembly-CSharp.dll";

/// Subdirectory of the data folder holding managed assemblies
const MANAGED_DIR: &str = "Managed";

/// Suffix appended to the game name to form its data folder
const DATA_SUFFIX: &str = "_Data";

/// Fallback for the tool's own name when `current_exe` is unavailable
const OWN_NAME_FALLBACK: &str = "modpatch";

// Build-time bundled artifacts; registered into the ResourceSet at startup
const PROXY_X86: &[u8] = include_bytes!("../assets/x86/version.dll");
const PROXY_X64: &[u8] = include_bytes!("../assets/x64/version.dll");
const DEFAULT_CONFIG: &str = include_str!("../assets/DefaultConfig.ini");

/// Install the mod-loader proxy into a game installation
#[derive(Parser, Debug)]
#[command(name = "modpatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Game installation root (defaults to the current directory)
    #[arg(short, long, default_value = ".")]
    game_dir: PathBuf,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Exit without waiting for a keypress
    #[arg(long)]
    no_pause: bool,
}

/// Everything the final report needs, handed stage to stage
struct PatchReport {
    game: PathBuf,
    arch: Architecture,
    framework: Option<FrameworkReport>,
    config_path: PathBuf,
    proxy_path: PathBuf,
    proxy_hash: String,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    info!("================================================");
    info!("    modpatch v{}", modpatch_core::VERSION);
    info!("================================================");

    let result = run(&cli);
    match &result {
        Ok(report) => print_report(report),
        Err(e) => error!("Patching failed: {e:#}"),
    }

    pause_for_key(&cli);
    if result.is_err() {
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber once; re-entry keeps the existing one
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let already_initialized = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .try_init()
        .is_err();
    if already_initialized {
        debug!("Tracing subscriber already initialized; keeping the existing one");
    }
}

/// The patch pipeline: locate → data dir → architecture → config →
/// framework → proxy. One shot, no retries; later stages never roll back
/// earlier ones.
fn run(cli: &Cli) -> Result<PatchReport> {
    let root = &cli.game_dir;
    let own_name = own_name();

    let game = find_target_executable(root, &own_name)
        .with_context(|| format!("failed to scan {}", root.display()))?
        .ok_or(Error::ExecutableNotFound { dir: root.clone() })?;
    let game_name = game
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .ok_or_else(|| Error::internal("game executable has no valid base name"))?;
    info!("Detected game executable: {}", game.display());

    let data_folder = format!("{game_name}{DATA_SUFFIX}");
    let data_dir = root.join(&data_folder);
    if !data_dir.is_dir() {
        return Err(Error::DataDirectoryNotFound { path: data_dir }.into());
    }

    let arch = inspect_architecture_at(&game)
        .with_context(|| format!("failed to classify {}", game.display()))?;
    info!("Game architecture: {arch}");

    let resources = builtin_resources();
    let config_path = data_dir.join(CONFIG_FILE_NAME);
    provision_config(&resources, &config_path)?;
    report_loader_settings(&config_path, root, &game_name, &data_folder);

    let core_assembly = data_dir.join(MANAGED_DIR).join(CORE_ASSEMBLY);
    let framework = if core_assembly.is_file() {
        let report = detect_framework(&core_assembly);
        info!("Target framework: {report}");
        Some(report)
    } else {
        warn!(
            "Core assembly '{}' not found; framework version undetermined",
            core_assembly.display()
        );
        None
    };

    let proxy_path = install_proxy(&resources, arch, root)?;
    let proxy_hash = install::content_hash(resources.get(install::proxy_resource_key(arch))?);

    Ok(PatchReport {
        game,
        arch,
        framework,
        config_path,
        proxy_path,
        proxy_hash,
    })
}

/// Registers all build-time bundled artifacts
fn builtin_resources() -> ResourceSet {
    let mut resources = ResourceSet::new();
    resources.insert(install::proxy_resource_key(Architecture::X86), PROXY_X86);
    resources.insert(install::proxy_resource_key(Architecture::X64), PROXY_X64);
    resources.insert(CONFIG_RESOURCE_KEY, DEFAULT_CONFIG.as_bytes());
    resources
}

/// Reads the provisioned configuration back and reports the loader hand-off.
///
/// `EnableLogging` and `LogPath` are consumed by the mod loader, not by the
/// patcher; they are surfaced here so the user sees the effective baseline.
fn report_loader_settings(config_path: &Path, root: &Path, game_name: &str, data_folder: &str) {
    let config = Config::load(config_path);
    if !config.loaded() {
        return;
    }
    if config.get_bool("EnableLogging", true) {
        let resolver = PathResolver::new(root, game_name, data_folder);
        let log_path = resolver.resolve(config.get_str("LogPath", "./Logs/Loader.log"));
        info!("Loader logging enabled; log path: {}", log_path.display());
    } else {
        info!("Loader logging disabled by configuration");
    }
}

/// The tool's own base name, used to exclude itself from executable discovery
fn own_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| OWN_NAME_FALLBACK.to_owned())
}

/// Maps the detected framework label to a mod build-target recommendation
fn recommendation(framework: Option<&FrameworkReport>) -> String {
    match framework.and_then(|f| f.value()) {
        Some(label) if label.contains("4.x") || label.contains("4.0") => {
            ".NET Framework 4.x (4.7.2 or newer)".to_owned()
        }
        Some(label) if label.contains("3.5") || label.contains("2.0") => {
            ".NET Framework 3.5".to_owned()
        }
        Some(label) => label.to_owned(),
        None => "undetermined".to_owned(),
    }
}

fn print_report(report: &PatchReport) {
    let framework = report
        .framework
        .as_ref()
        .map(|f| f.to_string())
        .unwrap_or_else(|| "undetermined".to_owned());

    info!("================================================");
    info!("    Patching completed successfully!");
    info!("    Game: {} ({})", report.game.display(), report.arch);
    info!("    Target framework: {framework}");
    info!(
        "    Recommended mod build target: {}",
        recommendation(report.framework.as_ref())
    );
    info!(
        "    Proxy: {} (blake3 {})",
        report.proxy_path.display(),
        report.proxy_hash
    );
    info!("    Config: {}", report.config_path.display());
    info!("================================================");
}

/// Waits for a keypress so double-click users can read the report
fn pause_for_key(cli: &Cli) {
    if cli.no_pause || !std::io::stdin().is_terminal() {
        return;
    }
    println!("Press Enter to exit...");
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Minimal PE image accepted by the architecture inspector
    fn pe_image(machine: u16) -> Vec<u8> {
        let mut image = vec![0u8; 0x40];
        image[0] = b'M';
        image[1] = b'Z';
        image[0x3c..0x40].copy_from_slice(&0x40u32.to_le_bytes());
        image.extend_from_slice(&0x0000_4550u32.to_le_bytes());
        image.extend_from_slice(&machine.to_le_bytes());
        image
    }

    fn cli_for(dir: &TempDir) -> Cli {
        Cli {
            game_dir: dir.path().to_path_buf(),
            verbose: 0,
            no_pause: true,
        }
    }

    #[test]
    fn test_full_run_installs_proxy_and_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Game.exe"), pe_image(0x8664)).unwrap();
        fs::create_dir(dir.path().join("Game_Data")).unwrap();

        let report = run(&cli_for(&dir)).unwrap();
        assert_eq!(report.arch, Architecture::X64);
        // No Managed/Assembly-CSharp.dll in the fixture
        assert!(report.framework.is_none());

        let proxy = fs::read(dir.path().join("version.dll")).unwrap();
        assert_eq!(proxy, PROXY_X64);

        let config = fs::read_to_string(dir.path().join("Game_Data").join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, DEFAULT_CONFIG);
    }

    #[test]
    fn test_run_fails_without_game_executable() {
        let dir = TempDir::new().unwrap();
        assert!(run(&cli_for(&dir)).is_err());
    }

    #[test]
    fn test_run_fails_without_data_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Game.exe"), pe_image(0x014c)).unwrap();
        assert!(run(&cli_for(&dir)).is_err());
    }

    #[test]
    fn test_recommendation_mapping() {
        let declared = FrameworkReport::Declared(".NETFramework,Version=v4.0".into());
        assert_eq!(
            recommendation(Some(&declared)),
            ".NET Framework 4.x (4.7.2 or newer)"
        );

        let inferred = FrameworkReport::Inferred(".NET 3.5 profile (mscorlib v2.0.0.0)".into());
        assert_eq!(recommendation(Some(&inferred)), ".NET Framework 3.5");

        let odd = FrameworkReport::Inferred("unknown mscorlib version: 1.0.0.0".into());
        assert_eq!(recommendation(Some(&odd)), "unknown mscorlib version: 1.0.0.0");

        assert_eq!(recommendation(None), "undetermined");
    }

    #[test]
    fn test_builtin_resources_carry_all_artifacts() {
        let resources = builtin_resources();
        assert!(resources.get(install::proxy_resource_key(Architecture::X86)).is_ok());
        assert!(resources.get(install::proxy_resource_key(Architecture::X64)).is_ok());
        assert_eq!(resources.get(CONFIG_RESOURCE_KEY).unwrap(), DEFAULT_CONFIG.as_bytes());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
