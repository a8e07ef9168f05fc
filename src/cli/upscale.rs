//! Upscale command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::config::loader::CliOverrides;
use crate::upscaler::{CommandUpscaler, UpscalerInvoker};

use super::{resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the upscale command
pub fn run_upscale(list: &Path, out: &Path, config_path: Option<&Path>) -> ExitCode {
    let config = match resolve_config(config_path, &CliOverrides::default()) {
        Ok(config) => config,
        Err(code) => return code,
    };

    if !list.is_file() {
        eprintln!("Error: List file '{}' not found", list.display());
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let upscaler = match CommandUpscaler::from_config(&config.upscaler) {
        Ok(upscaler) => upscaler,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    match upscaler.upscale(list, out) {
        Ok(()) => {
            println!("Upscaled images written to {}", out.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
