//! Lambda function that passes its event, as JSON, to the `flowdock-notifier`
//! executable and reports whether it succeeded.

pub mod error;
pub mod handler;
pub mod notifier;
pub mod sink;
mod util;

pub use error::NotifierError;
pub use handler::{function_handler, handle, COMPLETION_MESSAGE};
pub use notifier::{Notifier, Outcome, DEFAULT_PROGRAM};
pub use sink::{LogSink, OutputSink};
