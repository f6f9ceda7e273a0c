//! # procura
//!
//! Entry point for the `procura` binary. Setup and dispatch live in the
//! library (`procura_cli::run`) so they can be tested without a process.

use std::process::ExitCode;

use clap::Parser;

use procura_cli::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    procura_cli::init_tracing();
    procura_cli::run(Cli::parse()).await
}
