//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod list;
mod process;
mod upscale;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::batch::CancelToken;
use crate::config::loader::{find_config, load_config, merge_cli_overrides, CliOverrides};
use crate::config::{default_config, TexpackConfig};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// texpack - Repair AI-upscaled texture packs
#[derive(Parser)]
#[command(name = "texpack")]
#[command(about = "texpack - Classify upscaled textures and repair masks and solid-color images")]
#[command(version)]
pub struct Cli {
    /// Config file (default: texpack.toml found from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log each file as it is processed
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify upscaled images and repair masks and solid-color images
    Process {
        /// Image files or directories of images
        #[arg(required_unless_present = "list")]
        inputs: Vec<PathBuf>,

        /// Read input images from a list file (one path per line)
        #[arg(long)]
        list: Option<PathBuf>,

        /// Base output directory (default: directory of the first image)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Directory holding the pre-upscale originals
        #[arg(long)]
        originals: Option<PathBuf>,

        /// Extension of the originals when it differs from the upscaled files
        #[arg(long)]
        original_ext: Option<String>,

        /// Search input directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Number of worker threads (default: available parallelism)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error if any item was skipped
        #[arg(long)]
        strict: bool,
    },

    /// Only sort images into the masks and solid-color directories
    Classify {
        /// Image files or directories of images
        #[arg(required_unless_present = "list")]
        inputs: Vec<PathBuf>,

        /// Read input images from a list file (one path per line)
        #[arg(long)]
        list: Option<PathBuf>,

        /// Base output directory (default: directory of the first image)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Search input directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Number of worker threads (default: available parallelism)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error if any item was skipped
        #[arg(long)]
        strict: bool,
    },

    /// Write a list of the images in a directory, one path per line
    List {
        /// Directory to search
        dir: PathBuf,

        /// Include subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Comma-separated image extensions (default: from config)
        #[arg(long, value_delimiter = ',')]
        ext: Option<Vec<String>>,

        /// List file to write (default: print to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run the configured upscaler over a list file
    Upscale {
        /// List file of images to upscale
        #[arg(long)]
        list: PathBuf,

        /// Directory the upscaler writes into
        #[arg(short, long)]
        out: PathBuf,
    },
}

/// Install the tracing subscriber; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default = if verbose { "texpack=debug" } else { "texpack=info" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).without_time())
        .try_init();
}

/// Wait for Ctrl-C or SIGTERM on a helper thread and cancel `cancel`.
///
/// Images already being processed finish; a second Ctrl-C exits at once.
pub(crate) fn cancel_on_interrupt(cancel: CancelToken) {
    let spawned = std::thread::Builder::new().name("texpack-signals".to_string()).spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot install interrupt handler");
                return;
            }
        };
        runtime.block_on(async {
            if let Err(e) = interrupt_signal().await {
                tracing::warn!(error = %e, "Cannot install interrupt handler");
                return;
            }
            tracing::warn!("Interrupted; finishing images in progress (Ctrl-C again to abort)");
            cancel.cancel();
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        });
    });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "Cannot start interrupt handler thread");
    }
}

async fn interrupt_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Load the configuration from `path`, or discover it, then apply overrides.
///
/// Prints the error and returns the exit code on failure.
pub(crate) fn resolve_config(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<TexpackConfig, ExitCode> {
    let config_path = path.map(Path::to_path_buf).or_else(find_config);
    let mut config = match config_path {
        Some(config_path) => {
            tracing::debug!(path = %config_path.display(), "Using config");
            match load_config(Some(&config_path)) {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("Error loading config: {}", e);
                    return Err(ExitCode::from(EXIT_ERROR));
                }
            }
        }
        None => {
            tracing::debug!("No texpack.toml found, using defaults");
            default_config()
        }
    };

    merge_cli_overrides(&mut config, overrides);

    let errors = config.validate();
    if !errors.is_empty() {
        for error in errors {
            eprintln!("Error: {}", error);
        }
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }
    Ok(config)
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Process {
            inputs,
            list,
            out,
            originals,
            original_ext,
            recursive,
            jobs,
            json,
            strict,
        } => {
            let overrides = CliOverrides {
                out,
                originals,
                original_ext,
                recursive: recursive.then_some(true),
                jobs,
                ..Default::default()
            };
            process::run_process(
                &inputs,
                list.as_deref(),
                config,
                &overrides,
                process::ReportOptions { json, strict },
            )
        }
        Commands::Classify { inputs, list, out, recursive, jobs, json, strict } => {
            let overrides = CliOverrides {
                out,
                recursive: recursive.then_some(true),
                jobs,
                ..Default::default()
            };
            process::run_classify(
                &inputs,
                list.as_deref(),
                config,
                &overrides,
                process::ReportOptions { json, strict },
            )
        }
        Commands::List { dir, recursive, ext, out } => {
            let overrides = CliOverrides {
                extensions: ext,
                recursive: recursive.then_some(true),
                ..Default::default()
            };
            list::run_list(&dir, out.as_deref(), config, &overrides)
        }
        Commands::Upscale { list, out } => upscale::run_upscale(&list, &out, config),
    }
}
