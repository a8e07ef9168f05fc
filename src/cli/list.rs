//! List command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::batch::{discover_images, write_list};
use crate::config::loader::CliOverrides;

use super::{resolve_config, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the list command
pub fn run_list(
    dir: &Path,
    out: Option<&Path>,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> ExitCode {
    let config = match resolve_config(config_path, overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let files =
        match discover_images(dir, &config.normalized_extensions(), config.input.recursive) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("Error: Cannot list '{}': {}", dir.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        };

    match out {
        Some(out) => {
            if let Err(e) = write_list(out, &files) {
                eprintln!("Error: Cannot write '{}': {}", out.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
            println!("Listed {} images in {}", files.len(), out.display());
        }
        None => {
            for file in &files {
                println!("{}", file.display());
            }
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
