use std::{env, io, process::ExitCode};

use fetch_secret::{
    cli::{self, ResolverConfig, Resolution},
    commands::{FetchCommand, completions},
};
use tracing::{Level, subscriber};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> ExitCode {
    let resolution = cli::resolve(env::args_os(), ResolverConfig::default());
    let exit_code = ExitCode::from(resolution.exit_code());

    let options = match resolution {
        Resolution::Run(options) => options,
        Resolution::Help(text) => {
            print!("{text}");
            return exit_code;
        }
        Resolution::Completions(shell) => {
            completions::generate(shell, &mut io::stdout());
            return exit_code;
        }
        Resolution::Invalid(text) => {
            eprint!("{text}");
            return exit_code;
        }
    };

    if let Err(e) = init_logging(options.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match FetchCommand::new(options).execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Allow RUST_LOG env var to override verbosity flag
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbose >= 2)
        .with_file(verbose >= 3)
        .with_line_number(verbose >= 3)
        .compact()
        .finish();

    subscriber::set_global_default(subscriber)?;

    Ok(())
}
