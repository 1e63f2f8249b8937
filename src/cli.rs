use std::{ffi::OsString, path::PathBuf};

use clap::{ArgAction, CommandFactory, Parser, error::ErrorKind};
use clap_complete::Shell;

use crate::constants::DEFAULT_SECRETS_REGION;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "fetch-secret",
    version,
    about = "Fetch secrets from secrets manager and output to a file",
    long_about = None
)]
pub struct Cli {
    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        required_unless_present = "completions",
        help = "File path to append secret exports to"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'r',
        long,
        value_name = "AWS ARN",
        help = "Optional role ARN to assume when fetching secret"
    )]
    pub role: Option<String>,

    #[arg(
        short = 's',
        long,
        value_name = "AWS ARN | NAME",
        required_unless_present = "completions",
        help = "Secret ARN/name to read"
    )]
    pub secret: Option<String>,

    #[arg(long, help = "Fail unless --role is given")]
    pub require_role: bool,

    #[arg(
        long,
        default_value = DEFAULT_SECRETS_REGION,
        help = "Region of the secrets manager"
    )]
    pub region: String,

    #[arg(short = 'p', long, help = "AWS profile used when no role is assumed")]
    pub profile: Option<String>,

    #[arg(short = 'v', long, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[arg(
        long,
        value_enum,
        value_name = "SHELL",
        help = "Print a completion script for SHELL and exit"
    )]
    pub completions: Option<Shell>,
}

/// Settings that change which invocations are accepted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    pub role_required: bool,
}

/// A validated invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub output: PathBuf,
    pub role: Option<String>,
    pub secret: String,
    pub region: String,
    pub profile: Option<String>,
    pub verbose: u8,
}

/// Outcome of resolving the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Run the fetch with these options
    Run(Options),
    /// Help or version was requested; print to stdout and exit 0
    Help(String),
    /// Print a completion script and exit 0
    Completions(Shell),
    /// Required options are missing or unknown; print to stderr and exit 1
    Invalid(String),
}

impl Resolution {
    pub fn exit_code(&self) -> u8 {
        match self {
            Resolution::Invalid(_) => 1,
            _ => 0,
        }
    }
}

/// Parse `args` (including the binary name) into a [`Resolution`]
pub fn resolve<I, T>(args: I, config: ResolverConfig) -> Resolution
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    match Cli::try_parse_from(&args) {
        Ok(cli) => cli.into_resolution(config),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Resolution::Help(e.render().to_string())
        }
        // `-o -h` fails as a missing value before clap sees the help flag
        Err(_) if requests_help(&args) => Resolution::Help(Cli::command().render_help().to_string()),
        Err(e) => invalid(e),
    }
}

fn requests_help(args: &[OsString]) -> bool {
    args.iter()
        .skip(1)
        .take_while(|arg| *arg != "--")
        .any(|arg| arg == "-h" || arg == "--help")
}

fn invalid(err: clap::Error) -> Resolution {
    let help = Cli::command().render_help();
    Resolution::Invalid(format!("{}\n{help}", err.render()))
}

impl Cli {
    fn into_resolution(self, config: ResolverConfig) -> Resolution {
        if let Some(shell) = self.completions {
            return Resolution::Completions(shell);
        }

        // An empty --role means no role, as if the flag were absent
        let role = self.role.filter(|role| !role.is_empty());

        let role_required = config.role_required || self.require_role;
        if role_required && role.is_none() {
            return invalid(Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "the following required arguments were not provided:\n  --role <AWS ARN>",
            ));
        }

        // clap enforces both unless --completions was given, which returned above
        match (self.output, self.secret) {
            (Some(output), Some(secret)) => Resolution::Run(Options {
                output,
                role,
                secret,
                region: self.region,
                profile: self.profile,
                verbose: self.verbose,
            }),
            _ => invalid(Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "--output and --secret are required",
            )),
        }
    }
}
