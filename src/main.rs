//! `pkgdist` - assemble a relocatable package from native build output.

use anyhow::Result;
use clap::Parser;
use pkgdist::{BuildConfiguration, InstallStrategy, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pkgdist")]
#[command(about = "Collect executables and shared libraries into a relocatable package")]
#[command(version)]
struct Args {
    /// Build configuration (.json or .toml)
    #[arg(long, short, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Destination directory (overrides distDir)
    #[arg(long, short, value_name = "DIR")]
    out: Option<PathBuf>,

    /// How executables locate their libraries (overrides strategy)
    #[arg(long, value_enum)]
    strategy: Option<InstallStrategy>,

    /// Search-path rewriting tool (overrides patchTool)
    #[arg(long, value_name = "PATH")]
    patch_tool: Option<PathBuf>,

    /// Log every step
    #[arg(long, short, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();

    let mut config = BuildConfiguration::from_file(&args.config)?;
    if let Some(out) = args.out {
        config = config.with_dist_dir(out);
    }
    if let Some(strategy) = args.strategy {
        config = config.with_strategy(strategy);
    }
    if let Some(tool) = args.patch_tool {
        config = config.with_patch_tool(tool);
    }

    let report = pkgdist::run(&config)?;

    for path in &report.degraded {
        warn!("Degraded: {} still uses build-machine search paths", path.display());
    }
    info!(
        "Build complete: {} executables, {} libraries, {} missing, {} degraded",
        report.binaries.len(),
        report.libraries,
        report.missing.len(),
        report.degraded.len()
    );
    println!("Artifacts are in: {}", report.dist_dir.display());
    println!("To use: cd {} && npm link", report.dist_dir.display());
    Ok(())
}
