//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use parkroute_cli::CliError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    match parkroute_cli::run() {
        Ok(code) => code,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("parkroute: {err}");
            ExitCode::FAILURE
        }
    }
}
