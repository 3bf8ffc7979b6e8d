use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Everything that can go wrong while handing an event to the notifier.
///
/// The invoker only sees "the notifier failed"; the variants exist so the
/// reported message says which way it failed.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("notifier exited unsuccessfully ({status})")]
    Exit { status: ExitStatus },

    #[error("failed to read notifier output: {0}")]
    Io(#[from] io::Error),
}
