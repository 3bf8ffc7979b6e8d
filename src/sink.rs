use log::{error, info};

/// Destination for the lines a notifier writes.
pub trait OutputSink: Send + Sync {
    fn info(&self, line: &str);
    fn error(&self, line: &str);
}

/// Forwards stdout to `info!` and stderr to `error!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl OutputSink for LogSink {
    fn info(&self, line: &str) {
        info!(target: "notifier", "{}", line);
    }

    fn error(&self, line: &str) {
        error!(target: "notifier", "{}", line);
    }
}
