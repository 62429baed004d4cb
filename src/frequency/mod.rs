//! Tag frequency analysis
//!
//! Counts how many times each tag occurs across a corpus of tag sets. Counting
//! is case-insensitive; a bucket reports the casing it was first seen with.
//! Reports are ordered by count descending, ties broken by the lower-cased tag
//! ascending, so the same corpus always yields the same report.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::Result;
use crate::dataset::DatasetSource;
use crate::tags::{TagSet, canonical};

/// One line of a frequency report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Ranked tag occurrence counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyReport {
    /// Tag sets that contributed to the counts
    pub files: usize,
    pub entries: Vec<TagCount>,
}

impl FrequencyReport {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count for `tag`, ignoring case
    #[must_use]
    pub fn count(&self, tag: &str) -> usize {
        let key = canonical(tag);
        self.entries
            .iter()
            .find(|e| canonical(&e.tag) == key)
            .map_or(0, |e| e.count)
    }

    /// The `n` most frequent tags
    #[must_use]
    pub fn top(&self, n: usize) -> &[TagCount] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Keep only the `n` most frequent tags
    #[must_use]
    pub fn limited(mut self, limit: Option<usize>) -> Self {
        if let Some(n) = limit {
            self.entries.truncate(n);
        }
        self
    }

    /// `tag: count` lines
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.tag, e.count))
            .collect()
    }

    /// Write the report as CSV with a `tag,count` header.
    ///
    /// # Errors
    /// Returns `TagsmithError::Csv` if writing fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        for entry in &self.entries {
            out.serialize(entry)?;
        }
        out.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Pretty-printed JSON of the report
    ///
    /// # Errors
    /// Returns `TagsmithError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

struct Bucket {
    display: String,
    count: usize,
}

/// Streaming counter fed one tag set at a time
#[derive(Default)]
pub struct FrequencyAnalyzer {
    buckets: HashMap<String, Bucket>,
    files: usize,
}

impl FrequencyAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every tag of `tags`, duplicates included
    pub fn add(&mut self, tags: &TagSet) {
        self.files += 1;
        for tag in tags {
            self.buckets
                .entry(canonical(tag))
                .and_modify(|b| b.count += 1)
                .or_insert_with(|| Bucket {
                    display: tag.clone(),
                    count: 1,
                });
        }
    }

    /// Produce the ranked report
    #[must_use]
    pub fn finish(self) -> FrequencyReport {
        let mut ranked: Vec<(String, Bucket)> = self.buckets.into_iter().collect();
        ranked.sort_by(|(ka, a), (kb, b)| b.count.cmp(&a.count).then_with(|| ka.cmp(kb)));
        FrequencyReport {
            files: self.files,
            entries: ranked
                .into_iter()
                .map(|(_, b)| TagCount {
                    tag: b.display,
                    count: b.count,
                })
                .collect(),
        }
    }
}

/// Count the tags of an in-memory corpus
pub fn analyze<'a, I>(tag_sets: I) -> FrequencyReport
where
    I: IntoIterator<Item = &'a TagSet>,
{
    let mut analyzer = FrequencyAnalyzer::new();
    for tags in tag_sets {
        analyzer.add(tags);
    }
    analyzer.finish()
}

/// Count the tags of every item in `folder`, reading one tag file at a time.
///
/// # Errors
/// Returns discovery errors of the source and the first tag-file read error.
pub fn analyze_folder(source: &dyn DatasetSource, folder: &Path) -> Result<FrequencyReport> {
    let items = source.discover(folder)?;
    let mut analyzer = FrequencyAnalyzer::new();
    for item in &items {
        analyzer.add(&source.read_tags(item)?);
    }
    let report = analyzer.finish();
    debug!(folder = %folder.display(), files = report.files, tags = report.len(), "frequency analysis done");
    Ok(report)
}
