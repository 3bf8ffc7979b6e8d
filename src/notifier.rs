use crate::error::NotifierError;
use crate::sink::OutputSink;
use crate::util::CommandExt;
use log::debug;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

pub const DEFAULT_PROGRAM: &str = "./flowdock-notifier";

/// The external notifier executable and the arguments that precede the event.
#[derive(Debug, Clone, PartialEq)]
pub struct Notifier {
    program: PathBuf,
    args: Vec<OsString>,
    capture: bool,
}

/// What the notifier did, once it has exited. `stdout` and `stderr` stay
/// empty unless capture was turned on with [`Notifier::capture_output`].
#[derive(Debug)]
pub struct Outcome {
    pub status: ExitStatus,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl Outcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier::new(DEFAULT_PROGRAM)
    }
}

impl Notifier {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Notifier {
            program: program.into(),
            args: Vec::new(),
            capture: false,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Adds an argument placed before the payload.
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Keeps the forwarded lines in the returned [`Outcome`] as well.
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    /// Builds the command for `payload`. The payload is always the last
    /// argument and is never seen by a shell.
    pub fn command(&self, payload: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(payload).piped();
        cmd
    }

    /// Runs the notifier with `payload`, forwarding its stdout to
    /// `sink.info` and its stderr to `sink.error` until it exits.
    pub async fn run(
        &self,
        payload: &str,
        sink: &dyn OutputSink,
    ) -> Result<Outcome, NotifierError> {
        let mut cmd = self.command(payload);
        debug!("Running {}", cmd.display_line());

        let mut child = cmd.spawn().map_err(|source| NotifierError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Drain both pipes while waiting so a chatty child can't block on a full pipe.
        let (status, stdout, stderr) = tokio::join!(
            child.wait(),
            forward(stdout, self.capture, |line| sink.info(line)),
            forward(stderr, self.capture, |line| sink.error(line)),
        );

        let outcome = Outcome {
            status: status?,
            stdout: stdout?,
            stderr: stderr?,
        };
        debug!(
            "{} exited with {}",
            self.program.display(),
            outcome.status
        );
        Ok(outcome)
    }
}

/// Emits each line of `reader` without its newline. Lines that aren't valid
/// UTF-8 are emitted with every byte ASCII-escaped (`\xff`) so nothing is lost.
async fn forward<R, F>(
    reader: Option<R>,
    capture: bool,
    emit: F,
) -> io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
    F: Fn(&str),
{
    let mut lines = Vec::new();
    let reader = match reader {
        Some(r) => r,
        None => return Ok(lines),
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        let line = decode_line(&buf);
        emit(&line);
        if capture {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn decode_line(buf: &[u8]) -> String {
    match std::str::from_utf8(buf) {
        Ok(line) => line.to_owned(),
        Err(_) => buf.escape_ascii().to_string(),
    }
}
