use std::collections::HashSet;

use crate::tags::{TagSet, canonical};

/// Whole-set rewrite applied to each tag file independently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTransform {
    /// Drop tags whose words are contained in a longer tag of the same set
    RemoveRedundant,
    /// Shuffle the tag order
    Randomize,
    /// Drop case-insensitive duplicates, keeping the first occurrence
    Consolidate,
}

impl TagTransform {
    /// Apply the transformation to one tag set
    #[must_use]
    pub fn apply(self, tags: &TagSet) -> TagSet {
        match self {
            Self::RemoveRedundant => remove_redundant(tags),
            Self::Randomize => randomize(tags),
            Self::Consolidate => consolidate(tags),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RemoveRedundant => "Redundancy Removal",
            Self::Randomize => "Randomize",
            Self::Consolidate => "Consolidate",
        }
    }
}

/// Lower-cased words of a tag, split on whitespace and underscores
#[must_use]
pub fn words(tag: &str) -> Vec<String> {
    tag.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|w| !w.is_empty())
        .map(canonical)
        .collect()
}

/// `needle` appears in `haystack` in order, not necessarily contiguously
fn is_subsequence(needle: &[String], haystack: &[String]) -> bool {
    let mut rest = haystack.iter();
    needle.iter().all(|w| rest.any(|h| h == w))
}

/// Remove tags made redundant by a more specific tag in the same set.
///
/// Tag A is redundant when every word of A occurs, in order, among the words of a
/// tag B with more words (`"hair"` and `"long hair"` are redundant next to
/// `"very long hair"`). Tags with identical word lists are left for
/// [`consolidate`].
#[must_use]
pub fn remove_redundant(tags: &TagSet) -> TagSet {
    let split: Vec<Vec<String>> = tags.iter().map(|t| words(t)).collect();
    tags.iter()
        .zip(&split)
        .filter(|(_, mine)| {
            mine.is_empty()
                || !split
                    .iter()
                    .any(|other| other.len() > mine.len() && is_subsequence(mine, other))
        })
        .map(|(tag, _)| tag.as_str())
        .collect()
}

/// Uniformly random permutation of the tags.
///
/// Draws from the thread-local generator, seeded from OS entropy, so every call and
/// every run produces an independent order.
#[must_use]
pub fn randomize(tags: &TagSet) -> TagSet {
    let mut shuffled = tags.tags().to_vec();
    fastrand::shuffle(&mut shuffled);
    TagSet::from(shuffled)
}

/// Drop case-insensitive duplicates, keeping the first occurrence and its casing
#[must_use]
pub fn consolidate(tags: &TagSet) -> TagSet {
    let mut seen = HashSet::new();
    tags.iter()
        .filter(|t| seen.insert(canonical(t)))
        .map(String::as_str)
        .collect()
}
