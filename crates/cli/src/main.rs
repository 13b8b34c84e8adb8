//! cpw - mirror a file or directory into a destination and keep it in sync

use cli_lib::args::{self, Invocation, USAGE};
use cli_lib::{cmd, logging, settings};
use owo_colors::OwoColorize;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match args::parse(std::env::args_os()) {
        Invocation::Version => {
            cmd::version::run();
            ExitCode::SUCCESS
        }
        Invocation::Help(help) => {
            print!("{}", help);
            ExitCode::SUCCESS
        }
        Invocation::Usage(message) => {
            if let Some(message) = message {
                eprintln!("{}", message.trim_end());
            }
            println!("{}", USAGE);
            ExitCode::FAILURE
        }
        Invocation::Mirror {
            source,
            destination,
            config,
            verbosity,
        } => {
            let config = match settings::load(config.as_deref()) {
                Ok(config) => config,
                Err(e) => return fail(e),
            };

            // Held until exit so the file writer flushes
            let _guard = match logging::init(&config.log, verbosity) {
                Ok(guard) => guard,
                Err(e) => return fail(e),
            };

            match cmd::mirror::run(&source, &destination, &config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => fail(e),
            }
        }
    }
}

fn fail(e: impl Into<anyhow::Error>) -> ExitCode {
    eprintln!("{} {}", "Error:".red(), e.into());
    ExitCode::FAILURE
}
