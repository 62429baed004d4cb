//! Prompt generation from dataset tags
//!
//! A [`PromptGenerator`] draws random tags from the frequency report of a dataset
//! and wraps them with fixed leading and trailing tags. Tags that occur more
//! often in the dataset are more likely to be drawn, and no tag is drawn twice
//! for the same prompt. Every prompt is de-duplicated and has redundant tags
//! removed before it is returned.

use std::collections::HashSet;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use fastrand::Rng;
use tracing::debug;

use crate::batch::{CancelToken, ProgressSink};
use crate::frequency::{FrequencyReport, TagCount};
use crate::rules::{consolidate, remove_redundant};
use crate::tags::{TagSet, canonical};
use crate::{Result, TagsmithError};

/// File written next to the dataset by [`write_prompts`] callers
pub const OUTPUT_FILE_NAME: &str = "generatedPrompts.txt";

/// Allowed number of drawn tags per prompt
pub const TAG_COUNT_RANGE: RangeInclusive<usize> = 1..=50;

/// Allowed number of prompts in one output file
pub const PROMPT_COUNT_RANGE: RangeInclusive<usize> = 10..=65_535;

pub const DEFAULT_TAG_COUNT: usize = 20;
pub const DEFAULT_PROMPT_COUNT: usize = 1000;
pub const DEFAULT_APPEND: &str = "masterpiece, best quality, absurdres";

#[must_use]
pub fn clamp_tag_count(n: usize) -> usize {
    n.clamp(*TAG_COUNT_RANGE.start(), *TAG_COUNT_RANGE.end())
}

#[must_use]
pub fn clamp_prompt_count(n: usize) -> usize {
    n.clamp(*PROMPT_COUNT_RANGE.start(), *PROMPT_COUNT_RANGE.end())
}

#[allow(clippy::cast_precision_loss)]
fn weight(count: usize) -> f64 {
    count.max(1) as f64
}

/// Builds prompts from the tags of one dataset
#[derive(Debug, Clone)]
pub struct PromptGenerator {
    /// Dataset tags that may be drawn, fixed tags excluded
    candidates: Vec<TagCount>,
    prepend: Vec<String>,
    append: Vec<String>,
    tag_count: usize,
}

impl PromptGenerator {
    /// Create a generator drawing `tag_count` tags (clamped to
    /// [`TAG_COUNT_RANGE`]) per prompt from `report`.
    ///
    /// # Errors
    /// Returns `Validation` if the report holds no tag besides the fixed ones.
    pub fn new(
        report: &FrequencyReport,
        prepend: &[String],
        append: &[String],
        tag_count: usize,
    ) -> Result<Self> {
        let fixed: HashSet<String> = prepend.iter().chain(append).map(|t| canonical(t)).collect();
        let candidates: Vec<TagCount> = report
            .entries
            .iter()
            .filter(|e| !fixed.contains(&canonical(&e.tag)))
            .cloned()
            .collect();
        if candidates.is_empty() {
            return Err(TagsmithError::Validation(
                "The dataset has no tags to build prompts from".into(),
            ));
        }
        Ok(Self {
            candidates,
            prepend: prepend.to_vec(),
            append: append.to_vec(),
            tag_count: clamp_tag_count(tag_count),
        })
    }

    /// Tags drawn per prompt after clamping
    #[must_use]
    pub const fn tag_count(&self) -> usize {
        self.tag_count
    }

    /// Draw up to `tag_count` distinct dataset tags, weighted by occurrence.
    ///
    /// Each candidate gets the key `u^(1/count)` for a uniform `u` in `(0, 1]`;
    /// the largest keys win.
    fn sample(&self, rng: &mut Rng) -> Vec<&str> {
        let mut keyed: Vec<(f64, &str)> = self
            .candidates
            .iter()
            .map(|c| {
                let u = 1.0 - rng.f64();
                (u.powf(1.0 / weight(c.count)), c.tag.as_str())
            })
            .collect();
        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
        keyed.truncate(self.tag_count);
        keyed.into_iter().map(|(_, tag)| tag).collect()
    }

    /// One prompt: leading tags, drawn tags, trailing tags
    #[must_use]
    pub fn generate(&self, rng: &mut Rng) -> TagSet {
        let tags: TagSet = self
            .prepend
            .iter()
            .map(String::as_str)
            .chain(self.sample(rng))
            .chain(self.append.iter().map(String::as_str))
            .collect();
        remove_redundant(&consolidate(&tags))
    }

    /// Generate `count` prompts, reporting one step per prompt.
    ///
    /// Stops early when `cancel` is raised; the prompts made so far are returned.
    pub fn generate_many(
        &self,
        count: usize,
        rng: &mut Rng,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Vec<TagSet> {
        progress.on_total(count);
        let mut prompts = Vec::with_capacity(count);
        for _ in 0..count {
            if cancel.is_cancelled() {
                debug!(made = prompts.len(), count, "prompt generation cancelled");
                break;
            }
            prompts.push(self.generate(rng));
            progress.on_step();
        }
        prompts
    }
}

/// Write one prompt per line to `path`
///
/// # Errors
/// Returns `TagsmithError::Io` if the file cannot be written.
pub fn write_prompts(path: &Path, prompts: &[TagSet]) -> Result<()> {
    let mut text = String::new();
    for prompt in prompts {
        text.push_str(&prompt.to_line());
        text.push('\n');
    }
    fs::write(path, text).map_err(|e| TagsmithError::io(path, e))
}
