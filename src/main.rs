//! texpack - Command-line tool for repairing AI-upscaled textures

use std::process::ExitCode;

use texpack::cli;

fn main() -> ExitCode {
    cli::run()
}
