//! Overwrite prompt for the terminal.
//!
//! The prompt goes to stdout while the progress bar is drawn on stderr, so
//! the bar is cleared for as long as the question is waiting for an answer.

use std::path::Path;

use engine::ConfirmOverwrite;

use crate::progress::Indicator;

/// Asks `prompt` with `indicator`'s bars suspended.
pub struct TerminalConfirm<'a, I, C> {
    indicator: &'a I,
    prompt: C,
}

impl<'a, I: Indicator, C: ConfirmOverwrite> TerminalConfirm<'a, I, C> {
    pub fn new(indicator: &'a I, prompt: C) -> Self {
        TerminalConfirm { indicator, prompt }
    }
}

impl<I: Indicator, C: ConfirmOverwrite> ConfirmOverwrite for TerminalConfirm<'_, I, C> {
    fn confirm_overwrite(&mut self, destination: &Path) -> bool {
        let prompt = &mut self.prompt;
        self.indicator.suspend(|| prompt.confirm_overwrite(destination))
    }
}
