use std::process::ExitCode;

use anyhow::Result;

fn main() -> Result<ExitCode> {
    dashboard::cli::run()
}
