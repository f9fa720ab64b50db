//! rabbitry - production tracker for meat rabbit herds

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = rabbitry::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
