/// Application-level failures.
/// The show itself cannot fail; only the host around it can.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal setup failed: {0}")]
    TerminalInit(#[source] io::Error),

    #[error("terminal restore failed: {0}")]
    TerminalCleanup(#[source] io::Error),

    #[error("drawing failed: {0}")]
    Render(#[source] io::Error),

    #[error("could not open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("logger already installed")]
    LoggerInstalled,
}
