//! Output formatting for CLI display
//!
//! Helpers for printing dataset items, tag counts and batch progress.

use std::path::Path;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::Result;
use crate::batch::{BatchHandle, BatchResult, ProgressEvent, ProgressSink};

/// File name of `path`, or the whole path if it has none
#[must_use]
pub fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// Format an item with its tags for display
#[must_use]
pub fn item_with_tags(path: &Path, tags: &[String], quiet: bool) -> String {
    let name = file_name(path);
    if quiet {
        name
    } else if tags.is_empty() {
        format!("  {name} (no tags)")
    } else {
        format!("  {} [{}]", name, tags.join(", ").cyan())
    }
}

/// Format a tag with its occurrence count
#[must_use]
pub fn tag_with_count(tag: &str, count: usize, quiet: bool) -> String {
    if quiet {
        format!("{tag}: {count}")
    } else {
        format!("  {} {}", format!("{count:>6}").green(), tag)
    }
}

/// Progress bar for a batch, hidden in quiet mode
#[must_use]
pub fn progress_bar(label: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::with_template("{prefix} [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_prefix(label.to_string());
    bar
}

/// Progress sink drawing on a terminal bar; each new total restarts the bar
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    #[must_use]
    pub const fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarProgress {
    fn on_total(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn on_step(&self) {
        self.bar.inc(1);
    }
}

/// Drive `bar` from the events of a background batch until it finishes.
///
/// # Errors
/// Returns the error of the batch run, if any.
pub fn follow(handle: BatchHandle, bar: &ProgressBar) -> Result<BatchResult> {
    for event in handle.events() {
        match event {
            ProgressEvent::Total(n) => bar.set_length(n as u64),
            ProgressEvent::Step => bar.inc(1),
        }
    }
    bar.finish_and_clear();
    handle.wait()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_with_tags() {
        let path = Path::new("/data/1.txt");
        assert_eq!(item_with_tags(path, &[], true), "1.txt");
        assert_eq!(item_with_tags(path, &[], false), "  1.txt (no tags)");
        colored::control::set_override(false);
        assert_eq!(
            item_with_tags(path, &["a".into(), "b".into()], false),
            "  1.txt [a, b]"
        );
    }

    #[test]
    fn test_tag_with_count_quiet() {
        assert_eq!(tag_with_count("smile", 3, true), "smile: 3");
    }
}
