//! Terminal progress renderers.
//!
//! Two `ProgressSink` implementations backed by indicatif:
//! - `OneFileIndicator`: one bar per file, showing that file's percentage
//! - `GlobalIndicator`: a single bar across the whole run, with a file count
//!
//! Both implement `Indicator`, so other terminal output (the overwrite
//! prompt) can be written without tearing the bar.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use engine::ProgressSink;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const FILE_TEMPLATE: &str = "{prefix} {msg}\n[{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({binary_bytes_per_sec}, {eta})";
const GLOBAL_TEMPLATE: &str = "{prefix} {msg}\n[{elapsed_precise}] [{wide_bar:.green/blue}] {bytes}/{total_bytes} ({eta})";

/// A progress renderer that owns part of the terminal.
pub trait Indicator: ProgressSink {
    /// Run `f` with the bars cleared, redrawing them afterwards.
    fn suspend<R>(&self, f: impl FnOnce() -> R) -> R;
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Shows the progress of the current file only.
pub struct OneFileIndicator {
    num_files: usize,
    file_index: AtomicUsize,
    draw_to_terminal: bool,
    current: Mutex<Option<ProgressBar>>,
}

impl OneFileIndicator {
    pub fn new(num_files: usize) -> Self {
        OneFileIndicator {
            num_files,
            file_index: AtomicUsize::new(0),
            draw_to_terminal: true,
            current: Mutex::new(None),
        }
    }

    /// Same as `new`, but never draws anything.
    pub fn hidden(num_files: usize) -> Self {
        OneFileIndicator {
            draw_to_terminal: false,
            ..Self::new(num_files)
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(current) = self.current.lock() {
            if let Some(bar) = current.as_ref() {
                f(bar);
            }
        }
    }

    /// Bytes shown on the current file's bar.
    #[cfg(test)]
    fn position(&self) -> u64 {
        let mut position = 0;
        self.with_bar(|bar| position = bar.position());
        position
    }
}

impl ProgressSink for OneFileIndicator {
    fn on_new_file(&self, source: &Path, destination: &Path, size: u64) {
        let index = self.file_index.fetch_add(1, Ordering::Relaxed) + 1;
        let bar = if self.draw_to_terminal {
            ProgressBar::new(size)
        } else {
            ProgressBar::with_draw_target(Some(size), ProgressDrawTarget::hidden())
        };
        bar.set_style(style(FILE_TEMPLATE));
        bar.set_prefix(format!("[{}/{}]", index, self.num_files));
        bar.set_message(format!("{} -> {}", source.display(), destination.display()));

        if let Ok(mut current) = self.current.lock() {
            *current = Some(bar);
        }
    }

    fn on_file_transfer(&self, bytes: u64) {
        self.with_bar(|bar| bar.inc(bytes));
    }

    fn on_file_done(&self) {
        self.with_bar(|bar| bar.finish());
    }
}

impl Indicator for OneFileIndicator {
    fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        let bar = self.current.lock().ok().and_then(|current| current.clone());
        match bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

/// Shows bytes and files across the whole run.
pub struct GlobalIndicator {
    num_files: usize,
    files_done: AtomicUsize,
    bar: ProgressBar,
}

impl GlobalIndicator {
    pub fn new(num_files: usize, total_size: u64) -> Self {
        Self::with_draw_target(num_files, total_size, ProgressDrawTarget::stderr())
    }

    /// Same as `new`, but never draws anything.
    pub fn hidden(num_files: usize, total_size: u64) -> Self {
        Self::with_draw_target(num_files, total_size, ProgressDrawTarget::hidden())
    }

    fn with_draw_target(num_files: usize, total_size: u64, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total_size), target);
        bar.set_style(style(GLOBAL_TEMPLATE));
        bar.set_prefix(format!("[0/{}]", num_files));
        GlobalIndicator {
            num_files,
            files_done: AtomicUsize::new(0),
            bar,
        }
    }

    #[cfg(test)]
    fn files_done(&self) -> usize {
        self.files_done.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    fn bytes_done(&self) -> u64 {
        self.bar.position()
    }

    /// Finish the bar, leaving it on screen.
    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl ProgressSink for GlobalIndicator {
    fn on_new_file(&self, source: &Path, _destination: &Path, _size: u64) {
        self.bar.set_message(source.display().to_string());
    }

    fn on_file_transfer(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    fn on_file_done(&self) {
        let done = self.files_done.fetch_add(1, Ordering::Relaxed) + 1;
        self.bar.set_prefix(format!("[{}/{}]", done, self.num_files));
    }
}

impl Indicator for GlobalIndicator {
    fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.bar.suspend(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_indicator_counts_bytes_and_files() {
        let indicator = GlobalIndicator::hidden(2, 8);

        indicator.on_new_file(Path::new("a"), Path::new("out/a"), 5);
        indicator.on_file_transfer(5);
        indicator.on_file_transfer(0);
        indicator.on_file_done();
        indicator.on_new_file(Path::new("b"), Path::new("out/b"), 3);
        indicator.on_file_transfer(3);
        indicator.on_file_transfer(0);
        indicator.on_file_done();
        indicator.finish();

        assert_eq!(indicator.files_done(), 2);
        assert_eq!(indicator.bytes_done(), 8);
    }

    #[test]
    fn test_one_file_indicator_resets_per_file() {
        let indicator = OneFileIndicator::hidden(2);

        indicator.on_new_file(Path::new("a"), Path::new("out/a"), 5);
        indicator.on_file_transfer(5);
        assert_eq!(indicator.position(), 5);
        indicator.on_file_done();

        indicator.on_new_file(Path::new("b"), Path::new("out/b"), 3);
        assert_eq!(indicator.position(), 0);
        indicator.on_file_transfer(3);
        assert_eq!(indicator.position(), 3);
    }

    #[test]
    fn test_one_file_indicator_ignores_transfer_before_first_file() {
        let indicator = OneFileIndicator::hidden(1);
        indicator.on_file_transfer(10);
        indicator.on_file_done();
        assert_eq!(indicator.position(), 0);
    }

    #[test]
    fn test_suspend_runs_closure_and_keeps_bar_state() {
        let indicator = OneFileIndicator::hidden(1);
        assert_eq!(indicator.suspend(|| 7), 7, "no bar yet");

        indicator.on_new_file(Path::new("a"), Path::new("out/a"), 5);
        indicator.on_file_transfer(2);
        assert!(indicator.suspend(|| true));
        indicator.on_file_transfer(3);
        assert_eq!(indicator.position(), 5);

        let global = GlobalIndicator::hidden(1, 5);
        global.on_file_transfer(5);
        assert_eq!(global.suspend(|| "answer"), "answer");
        assert_eq!(global.bytes_done(), 5);
    }
}
