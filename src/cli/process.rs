//! Pipeline command implementations (process, classify)

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::batch::{expand_inputs, read_list, BatchContext, Pipeline, RunReport};
use crate::config::loader::CliOverrides;
use crate::config::TexpackConfig;
use crate::image_access::FsImageAccess;
use crate::originals::{MappedLocator, MirrorLocator, OriginalLocator};

use super::{cancel_on_interrupt, resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// How the run report is printed and judged
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Print JSON instead of the text summary
    pub json: bool,
    /// Any skipped item fails the command
    pub strict: bool,
}

/// Execute the process command
pub fn run_process(
    inputs: &[PathBuf],
    list: Option<&Path>,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
    options: ReportOptions,
) -> ExitCode {
    let (config, images) = match prepare(inputs, list, config_path, overrides) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };

    let locator = original_locator(&config);
    let mut pipeline = build_pipeline(config, &images, locator);
    cancel_on_interrupt(pipeline.cancel_token());
    match pipeline.run(&images) {
        Ok(report) => finish(&report, options),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the classify command
pub fn run_classify(
    inputs: &[PathBuf],
    list: Option<&Path>,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
    options: ReportOptions,
) -> ExitCode {
    let (config, images) = match prepare(inputs, list, config_path, overrides) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };

    let mut pipeline = build_pipeline(config, &images, Box::new(MappedLocator::new()));
    cancel_on_interrupt(pipeline.cancel_token());
    match pipeline.classify_batch(&images) {
        Ok(report) => finish(&report, options),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Load config and expand the inputs into the image list.
fn prepare(
    inputs: &[PathBuf],
    list: Option<&Path>,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<(TexpackConfig, Vec<PathBuf>), ExitCode> {
    let config = resolve_config(config_path, overrides)?;

    let mut all_inputs = inputs.to_vec();
    if let Some(list) = list {
        match read_list(list) {
            Ok(listed) => all_inputs.extend(listed),
            Err(e) => {
                eprintln!("Error: Cannot read list '{}': {}", list.display(), e);
                return Err(ExitCode::from(EXIT_ERROR));
            }
        }
    }

    let images =
        match expand_inputs(&all_inputs, &config.normalized_extensions(), config.input.recursive) {
            Ok(images) => images,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Err(ExitCode::from(EXIT_ERROR));
            }
        };

    if images.is_empty() {
        eprintln!("Error: No images to process");
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }
    Ok((config, images))
}

/// Base output directory: configured, or the directory of the first image.
fn output_dir(config: &TexpackConfig, images: &[PathBuf]) -> PathBuf {
    if let Some(dir) = &config.output.dir {
        return dir.clone();
    }
    images
        .first()
        .and_then(|first| first.parent())
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn original_locator(config: &TexpackConfig) -> Box<dyn OriginalLocator> {
    match &config.originals.dir {
        Some(dir) => Box::new(
            MirrorLocator::new(dir.clone()).with_extension(config.originals.extension.clone()),
        ),
        None => {
            tracing::warn!("No originals directory configured; solid-color images cannot be repaired");
            Box::new(MappedLocator::new())
        }
    }
}

fn build_pipeline(
    config: TexpackConfig,
    images: &[PathBuf],
    locator: Box<dyn OriginalLocator>,
) -> Pipeline {
    let output_dir = output_dir(&config, images);
    let context = BatchContext::new(config, output_dir);
    Pipeline::new(context, Box::new(FsImageAccess::new()), locator)
}

/// Print the report and pick the exit code.
fn finish(report: &RunReport, options: ReportOptions) -> ExitCode {
    if options.json {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("{}", report.summary());
    }

    if options.strict && !report.is_success() {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;

    #[test]
    fn test_output_dir_defaults_to_first_image_parent() {
        let config = default_config();
        let images = vec![PathBuf::from("/tex/up/a.png"), PathBuf::from("/other/b.png")];
        assert_eq!(output_dir(&config, &images), PathBuf::from("/tex/up"));
    }

    #[test]
    fn test_output_dir_bare_file_name() {
        let config = default_config();
        assert_eq!(output_dir(&config, &[PathBuf::from("a.png")]), PathBuf::from("."));
    }

    #[test]
    fn test_output_dir_from_config() {
        let mut config = default_config();
        config.output.dir = Some(PathBuf::from("/out"));
        assert_eq!(output_dir(&config, &[PathBuf::from("/tex/a.png")]), PathBuf::from("/out"));
    }
}
