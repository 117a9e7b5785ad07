use std::ffi::OsString;
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{value_parser, Arg, ArgAction, Command, CommandFactory, Parser};
use mocapstream_session::{
    ConfigurableRequest, FrameLimit, OutputTarget, SessionConfig, DEFAULT_FRAME_COUNT,
    DEFAULT_TIMEOUT,
};
use mocapstream_transport::{DEFAULT_ADDRESS, DEFAULT_PORT};

use crate::exit::FAILURE;

pub const ADDRESS_ENV: &str = "MOCAPSTREAM_ADDRESS";
pub const PORT_ENV: &str = "MOCAPSTREAM_PORT";
pub const TIMEOUT_MS_ENV: &str = "MOCAPSTREAM_TIMEOUT_MS";

pub const DEFAULT_SEPARATOR: &str = ",";
pub const DEFAULT_NEWLINE: &str = "\n";

pub const PROGRAM_NAME: &str = "mocapstream";
const DEFAULT_TIMEOUT_MS: u64 = DEFAULT_TIMEOUT.as_millis() as u64;

/// Raw command line. Usage text is rendered by [`print_help`], not clap.
///
/// Connection settings come from the environment and stay out of the
/// usage text.
#[derive(Parser, Debug)]
#[command(
    name = "mocapstream",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
struct Cli {
    #[arg(long, action = ArgAction::SetTrue)]
    help: bool,

    #[arg(long, value_name = "arg", default_value = "", allow_hyphen_values = true)]
    file: String,

    #[arg(
        long,
        value_name = "N",
        default_value_t = 0,
        allow_hyphen_values = true,
        value_parser = value_parser!(u32)
    )]
    frames: u32,

    #[arg(long)]
    header: bool,

    #[arg(long, hide = true, env = ADDRESS_ENV, default_value = DEFAULT_ADDRESS)]
    address: String,

    #[arg(long, hide = true, env = PORT_ENV, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(
        long = "timeout-ms",
        hide = true,
        env = TIMEOUT_MS_ENV,
        default_value_t = DEFAULT_TIMEOUT_MS,
        value_parser = value_parser!(u64).range(1..)
    )]
    timeout_ms: u64,
}

/// Settings for one streaming run.
///
/// Built from defaults, then environment overrides, then flags. Read-only
/// once parsing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLineOptions {
    /// Output file. Empty writes to standard output.
    pub filename: String,
    /// Frames to read. Zero selects the default session length.
    pub frames: u32,
    pub address: String,
    pub port: u16,
    pub separator: String,
    pub newline: String,
    /// Print channel names in the first row.
    pub header: bool,
    pub timeout: Duration,
}

impl Default for CommandLineOptions {
    fn default() -> Self {
        Self {
            filename: String::new(),
            frames: 0,
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            separator: DEFAULT_SEPARATOR.to_string(),
            newline: DEFAULT_NEWLINE.to_string(),
            header: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl From<Cli> for CommandLineOptions {
    fn from(cli: Cli) -> Self {
        Self {
            filename: cli.file,
            frames: cli.frames,
            address: cli.address,
            port: cli.port,
            header: cli.header,
            timeout: Duration::from_millis(cli.timeout_ms),
            ..Self::default()
        }
    }
}

/// Why parsing did not produce options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The arguments were rejected; the message is shown above the usage text.
    Invalid(String),
    /// `--help` was given.
    HelpRequested,
}

impl ParseOutcome {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Invalid(message) => Some(message),
            Self::HelpRequested => None,
        }
    }
}

impl fmt::Display for ParseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(message) => f.write_str(message),
            Self::HelpRequested => f.write_str("help requested"),
        }
    }
}

impl CommandLineOptions {
    /// Parse flags (program name excluded) with environment overrides.
    ///
    /// `--help` anywhere outside a flag value wins over every error.
    /// Otherwise the first problem found is reported.
    pub fn parse<I>(args: I) -> Result<Self, ParseOutcome>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let argv = std::iter::once(OsString::from(PROGRAM_NAME)).chain(args.iter().cloned());

        match Cli::try_parse_from(argv) {
            Ok(cli) if cli.help => Err(ParseOutcome::HelpRequested),
            Ok(cli) => Ok(cli.into()),
            Err(err) => {
                let command = Cli::command();
                if help_in_flag_position(&command, &args) {
                    Err(ParseOutcome::HelpRequested)
                } else {
                    Err(ParseOutcome::Invalid(diagnostic(&command, &err, &args)))
                }
            }
        }
    }

    /// Number of frames the session reads.
    pub fn frame_limit(&self) -> FrameLimit {
        match self.frames {
            0 => FrameLimit::Count(DEFAULT_FRAME_COUNT),
            n => FrameLimit::Count(u64::from(n)),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            address: self.address.clone(),
            port: self.port,
            output: OutputTarget::from_filename(&self.filename),
            frame_limit: self.frame_limit(),
            timeout: self.timeout,
            request: ConfigurableRequest::default(),
        }
    }
}

fn find_long<'a>(command: &'a Command, token: &str) -> Option<&'a Arg> {
    let long = token.strip_prefix("--")?;
    command.get_arguments().find(|arg| arg.get_long() == Some(long))
}

/// Walk the tokens the way clap assigns values and look for `--help`.
///
/// Clap stops at its first error, so a `--help` after a bad token is only
/// visible to a separate scan.
fn help_in_flag_position(command: &Command, args: &[OsString]) -> bool {
    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        if token == "--help" {
            return true;
        }
        let Some(arg) = token.to_str().and_then(|t| find_long(command, t)) else {
            continue;
        };
        if !arg.get_action().takes_values() {
            continue;
        }
        let value_follows = tokens.as_slice().first().is_some_and(|next| {
            arg.is_allow_hyphen_values_set() || !next.to_string_lossy().starts_with('-')
        });
        if value_follows {
            tokens.next();
        }
    }
    false
}

fn context(err: &clap::Error, kind: ContextKind) -> Option<&str> {
    match err.get(kind) {
        Some(ContextValue::String(value)) => Some(value),
        _ => None,
    }
}

/// Translate a clap error into the one-line diagnostic shown above usage.
fn diagnostic(command: &Command, err: &clap::Error, args: &[OsString]) -> String {
    let invalid_arg = context(err, ContextKind::InvalidArg).unwrap_or_default();
    // Rendered as `--frames <N>`; the flag is the first word.
    let flag = invalid_arg.split_whitespace().next().unwrap_or_default();
    let value = context(err, ContextKind::InvalidValue).unwrap_or_default();

    match err.kind() {
        ErrorKind::InvalidValue if value.is_empty() => {
            format!("Missing required argument for {flag}")
        }
        ErrorKind::InvalidValue | ErrorKind::ValueValidation => {
            format!("Invalid value \"{value}\" for {}", value_origin(command, flag, args))
        }
        _ if !invalid_arg.is_empty() => format!("Unrecognized option \"{invalid_arg}\""),
        _ => err
            .to_string()
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_string(),
    }
}

/// Name the flag, or its environment variable when the value came from there.
fn value_origin(command: &Command, flag: &str, args: &[OsString]) -> String {
    let given = args.iter().any(|token| {
        token
            .to_str()
            .is_some_and(|t| t == flag || t.starts_with(&format!("{flag}=")))
    });
    let variable = find_long(command, flag).and_then(Arg::get_env);

    match variable {
        Some(variable) if !given => variable.to_string_lossy().into_owned(),
        _ => flag.to_string(),
    }
}

/// Write the usage text, preceded by the parse diagnostic if there is one.
///
/// Returns the process exit code for a run that stopped at parsing.
pub fn print_help<W: Write>(out: &mut W, program: &str, outcome: &ParseOutcome) -> io::Result<i32> {
    let nl = DEFAULT_NEWLINE;
    if let Some(message) = outcome.message().filter(|m| !m.is_empty()) {
        write!(out, "{message}{nl}{nl}")?;
    }

    write!(
        out,
        "Usage: {program} [options...]{nl}{nl}\
         Allowed options:{nl}\
         \x20 --help         show help message{nl}\
         \x20 --file arg     output file{nl}\
         \x20 --frames N     read N frames{nl}\
         \x20 --header       show channel names in the first row{nl}\
         {nl}"
    )?;
    out.flush()?;

    Ok(FAILURE)
}
