//! `authstate` command-line tool.
//!
//! Thin entry point over [`authstate::cli`]; see `authstate --help`.

use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let args = authstate::AuthStateArgs::parse();

    match authstate::cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
