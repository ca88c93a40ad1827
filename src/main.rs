use clap::Parser;

use dupescan::cli::Cli;
use dupescan::duplicates::FinderError;
use dupescan::error::{ExitCode, StructuredError};
use dupescan::run_app;

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    let exit_code = match run_app(cli) {
        Ok(code) => code,
        Err(err) => {
            let code = match err.downcast_ref::<FinderError>() {
                Some(FinderError::Interrupted) => ExitCode::Interrupted,
                _ => ExitCode::GeneralError,
            };

            if json_errors {
                let structured = StructuredError::new(&err, code);
                match serde_json::to_string(&structured) {
                    Ok(json) => eprintln!("{json}"),
                    Err(_) => eprintln!("Error: {err:#}"),
                }
            } else {
                eprintln!("Error: {err:#}");
            }

            code
        }
    };

    std::process::exit(exit_code.as_i32());
}
