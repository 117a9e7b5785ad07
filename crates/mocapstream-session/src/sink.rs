use std::fmt;
use std::path::PathBuf;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWrite;
use tracing::debug;

use crate::error::{Result, SessionError};

/// Destination for raw frame payloads.
pub type OutputSink = Box<dyn AsyncWrite + Send + Unpin>;

/// Where frame payloads are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output.
    #[default]
    Stdout,
    /// A file, created or truncated when the session opens it.
    File(PathBuf),
}

impl OutputTarget {
    /// Map a `--file` argument to a target. Empty means standard output.
    pub fn from_filename(name: &str) -> Self {
        if name.is_empty() {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(name))
        }
    }

    /// Open the target for writing, discarding any existing file content.
    pub async fn open(&self) -> Result<OutputSink> {
        match self {
            Self::Stdout => Ok(Box::new(tokio::io::stdout())),
            Self::File(path) => {
                let file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)
                    .await
                    .map_err(|source| SessionError::Sink {
                        target: self.to_string(),
                        source,
                    })?;
                debug!(?path, "opened output file");
                Ok(Box::new(file))
            }
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
