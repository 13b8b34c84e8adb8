//! Command-line arguments

use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Usage text printed on argument errors
pub const USAGE: &str = "Usage: cpw <source> <destination>\n       cpw -version";

/// cpw - mirror a file or directory and keep the copy in sync
#[derive(Parser, Debug)]
#[command(name = "cpw")]
#[command(long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Show version information
    #[arg(long)]
    pub version: bool,

    /// Config file (default: $CPW_CONFIG, then <config dir>/cpw/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Source file or directory, then destination directory
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// What the process should do after parsing
#[derive(Debug)]
pub enum Invocation {
    /// Print the version and exit 0
    Version,
    /// Mirror `source` into `destination`
    Mirror {
        source: PathBuf,
        destination: PathBuf,
        config: Option<PathBuf>,
        verbosity: Verbosity,
    },
    /// Help was requested; print it and exit 0
    Help(String),
    /// Bad arguments; print usage and exit 1
    Usage(Option<String>),
}

/// Log level override from flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// Accept the single-dash long form `-version` as well as `--version`
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if arg == "-version" {
                OsString::from("--version")
            } else {
                arg
            }
        })
        .collect()
}

/// Parse arguments into an [`Invocation`]
pub fn parse<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let cli = match Cli::try_parse_from(normalize_args(args)) {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => return Invocation::Help(e.to_string()),
        Err(e) => return Invocation::Usage(Some(e.to_string())),
    };

    if cli.version {
        return Invocation::Version;
    }

    let [source, destination]: [PathBuf; 2] = match cli.paths.try_into() {
        Ok(pair) => pair,
        Err(_) => return Invocation::Usage(None),
    };

    let verbosity = if cli.verbose {
        Verbosity::Verbose
    } else if cli.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    };

    Invocation::Mirror {
        source,
        destination,
        config: cli.config,
        verbosity,
    }
}
