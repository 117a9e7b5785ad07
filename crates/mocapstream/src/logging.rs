use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Filter directives for stderr logging, in `EnvFilter` syntax.
pub const LOG_ENV: &str = "MOCAPSTREAM_LOG";
/// Log line format: `text` or `json`.
pub const LOG_FORMAT_ENV: &str = "MOCAPSTREAM_LOG_FORMAT";

const DEFAULT_DIRECTIVES: &str = "warn";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?} (expected text or json)")),
        }
    }
}

pub fn init_logging(format: LogFormat, filter: EnvFilter) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

/// Install the stderr subscriber configured by `MOCAPSTREAM_LOG` and
/// `MOCAPSTREAM_LOG_FORMAT`.
pub fn init_from_env() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let (format, format_error) = match std::env::var(LOG_FORMAT_ENV) {
        Ok(value) => match value.parse() {
            Ok(format) => (format, None),
            Err(err) => (LogFormat::default(), Some(err)),
        },
        Err(_) => (LogFormat::default(), None),
    };

    init_logging(format, filter);
    if let Some(err) = format_error {
        tracing::warn!(variable = LOG_FORMAT_ENV, "{err}");
    }
}
