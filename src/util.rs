use std::process::Stdio;
use tokio::process::Command;

pub trait CommandExt {
    /// Null stdin, piped stdout/stderr, child killed if the handle is dropped.
    fn piped(&mut self) -> &mut Self;

    /// Program and arguments joined by spaces, for logging only.
    fn display_line(&self) -> String;
}

impl CommandExt for Command {
    fn piped(&mut self) -> &mut Self {
        self.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
    }

    fn display_line(&self) -> String {
        let std = self.as_std();
        let mut parts = vec![std.get_program().to_string_lossy().into_owned()];
        parts.extend(std.get_args().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}
