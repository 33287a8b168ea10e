//! Overwrite confirmation.
//!
//! With `OverwritePolicy::Ask`, the engine asks a `ConfirmOverwrite`
//! implementation before replacing an existing destination. The CLI wires in
//! `StdinConfirm`; tests and non-interactive callers use `FixedAnswer`.

use std::io::{self, BufRead, Write};
use std::path::Path;

/// Decides whether an existing destination may be overwritten.
pub trait ConfirmOverwrite {
    /// Return true to overwrite `destination`, false to skip it.
    fn confirm_overwrite(&mut self, destination: &Path) -> bool;
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl ConfirmOverwrite for FixedAnswer {
    fn confirm_overwrite(&mut self, _destination: &Path) -> bool {
        self.0
    }
}

/// Prompts on an output stream and reads one line of input.
///
/// Only the exact answer `y` overwrites; anything else, including a read
/// failure or end of input, skips.
pub struct StdinConfirm<R, W> {
    input: R,
    output: W,
}

impl StdinConfirm<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on stdout and read answers from stdin.
    pub fn new() -> Self {
        StdinConfirm {
            input: io::stdin().lock(),
            output: io::stdout(),
        }
    }
}

impl Default for StdinConfirm<io::StdinLock<'static>, io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead, W: Write> StdinConfirm<R, W> {
    pub fn with_streams(input: R, output: W) -> Self {
        StdinConfirm { input, output }
    }
}

impl<R: BufRead, W: Write> ConfirmOverwrite for StdinConfirm<R, W> {
    fn confirm_overwrite(&mut self, destination: &Path) -> bool {
        let _ = writeln!(self.output, "File: '{}' already exists", destination.display());
        let _ = writeln!(self.output, "Overwrite?");
        let _ = self.output.flush();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => answer.trim_end_matches(['\r', '\n']) == "y",
        }
    }
}
