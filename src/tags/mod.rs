//! Tag sets
//!
//! A [`TagSet`] is the ordered tag list of one dataset item. On disk it is a single
//! line of tags joined by `", "`. Comparisons between tags are case-insensitive,
//! while the original casing is kept for display and serialization.

use std::collections::HashMap;
use std::fmt;

/// Separator between tags in a tag file
pub const TAG_DELIMITER: char = ',';

/// Separator used when writing a tag set back to disk
pub const TAG_JOINER: &str = ", ";

/// Lower-cased comparison key for a tag
#[must_use]
pub fn canonical(tag: &str) -> String {
    tag.to_lowercase()
}

/// Ordered, case-insensitive collection of tags for one dataset item.
///
/// Tags are always trimmed and non-empty, and never contain [`TAG_DELIMITER`].
/// The set is immutable: every transformation builds a new `TagSet`.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    tags: Vec<String>,
    // lower-cased tag -> first position
    index: HashMap<String, usize>,
}

impl TagSet {
    /// Create an empty tag set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the contents of a tag file.
    ///
    /// Splits on commas, trims whitespace and drops empty entries.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        text.split(TAG_DELIMITER).collect()
    }

    /// Tags in display order
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Case-insensitive membership test
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains_key(&canonical(tag.trim()))
    }

    /// Position of the first case-insensitive match
    #[must_use]
    pub fn position(&self, tag: &str) -> Option<usize> {
        self.index.get(&canonical(tag.trim())).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.tags.iter()
    }

    /// Serialize to the on-disk line format (`"tag1, tag2, tag3"`)
    #[must_use]
    pub fn to_line(&self) -> String {
        self.tags.join(TAG_JOINER)
    }

    /// Consume the set and return the ordered tags
    #[must_use]
    pub fn into_tags(self) -> Vec<String> {
        self.tags
    }

    /// Same tags with the same case-sensitive text in the same order
    #[must_use]
    pub fn is_identical(&self, other: &Self) -> bool {
        self.tags == other.tags
    }
}

impl PartialEq for TagSet {
    fn eq(&self, other: &Self) -> bool {
        self.tags.len() == other.tags.len()
            && self
                .tags
                .iter()
                .zip(&other.tags)
                .all(|(a, b)| a.to_lowercase() == b.to_lowercase())
    }
}

impl Eq for TagSet {}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    /// Build a set from raw tags. Entries are trimmed, empty entries are dropped and
    /// entries containing the delimiter are split into several tags.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Vec::new();
        let mut index = HashMap::new();
        for raw in iter {
            for part in raw.as_ref().split(TAG_DELIMITER) {
                let tag = part.trim();
                if tag.is_empty() {
                    continue;
                }
                index.entry(canonical(tag)).or_insert(tags.len());
                tags.push(tag.to_string());
            }
        }
        Self { tags, index }
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// Split a user-supplied comma-separated list (`"a, b ,c"`) into trimmed, non-empty entries
#[must_use]
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
