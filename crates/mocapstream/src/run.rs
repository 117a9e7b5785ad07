use mocapstream_session::{run_session, SessionReport};
use tracing::{debug, info};

use crate::exit::{io_error, session_error, CliResult};
use crate::options::CommandLineOptions;

/// Run one session on a dedicated single-threaded runtime.
///
/// The runtime lives for exactly one session and is torn down before
/// returning, so every sink write has completed by the time the caller
/// prints the report.
pub fn run(options: &CommandLineOptions) -> CliResult<SessionReport> {
    let config = options.session_config();
    debug!(
        header = options.header,
        separator = %options.separator.escape_debug(),
        newline = %options.newline.escape_debug(),
        "frames are written raw; row formatting options are not applied"
    );
    info!(
        address = %config.address,
        port = config.port,
        output = %config.output,
        limit = ?config.frame_limit,
        timeout = ?config.timeout,
        "starting session"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("failed to start runtime", err))?;

    runtime
        .block_on(run_session(&config))
        .map_err(|err| session_error("session", err))
}
