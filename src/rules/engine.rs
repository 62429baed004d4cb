use std::collections::{HashMap, HashSet};

use super::EditRules;
use crate::tags::{TagSet, canonical};

/// Result of applying rules to one tag set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub tags: TagSet,
    pub modified: bool,
}

/// Rules compiled into lower-cased lookup tables, reused for every file of a batch
#[derive(Debug, Clone)]
pub struct RuleEngine {
    remove: HashSet<String>,
    // lower-cased replace_from entry -> first index in replace_from
    replace: HashMap<String, usize>,
    replace_to: Vec<String>,
    append: Vec<String>,
    anchor: Option<String>,
    emphasize: Vec<String>,
    prepend: Vec<String>,
}

impl RuleEngine {
    #[must_use]
    pub fn new(rules: &EditRules) -> Self {
        let mut replace = HashMap::new();
        for (k, from) in rules.replace_from.iter().enumerate() {
            replace.entry(canonical(from.trim())).or_insert(k);
        }
        Self {
            remove: rules.remove.iter().map(|t| canonical(t.trim())).collect(),
            replace,
            replace_to: rules.replace_to.iter().map(|t| t.trim().to_string()).collect(),
            append: clean(&rules.append),
            anchor: rules.anchor().map(canonical),
            emphasize: rules.emphasize.iter().map(|t| canonical(t.trim())).collect(),
            prepend: clean(&rules.prepend),
        }
    }

    /// Whether the append step has anything to insert
    #[must_use]
    pub fn appends(&self) -> bool {
        !self.append.is_empty()
    }

    /// An empty tag file is left alone unless there is something to append to it
    #[must_use]
    pub fn skips(&self, tags: &TagSet) -> bool {
        tags.is_empty() && !self.appends()
    }

    /// Apply every step in order: remove, replace, append, emphasize, prepend.
    #[must_use]
    pub fn apply(&self, input: &TagSet) -> Applied {
        let mut tags: Vec<String> = input.tags().to_vec();
        let mut modified = false;

        if !self.remove.is_empty() {
            let before = tags.len();
            tags.retain(|t| !self.remove.contains(&canonical(t)));
            modified |= tags.len() != before;
        }

        if !self.replace.is_empty() && !self.replace_to.is_empty() {
            let mut replaced = Vec::with_capacity(tags.len());
            for tag in tags {
                let target = self.replace.get(&canonical(&tag)).and_then(|&k| {
                    self.replace_to
                        .get(k)
                        .or_else(|| (self.replace_to.len() == 1).then(|| &self.replace_to[0]))
                });
                match target {
                    Some(new) if *new != tag => {
                        modified = true;
                        // An empty replacement value deletes the tag
                        if !new.is_empty() {
                            replaced.push(new.clone());
                        }
                    }
                    _ => replaced.push(tag),
                }
            }
            tags = replaced;
        }

        if !self.append.is_empty() {
            match &self.anchor {
                Some(anchor) => {
                    if let Some(pos) = tags.iter().position(|t| canonical(t) == *anchor) {
                        let tail = tags.split_off(pos + 1);
                        tags.extend(self.append.iter().cloned());
                        tags.extend(tail);
                        modified = true;
                    }
                }
                None => {
                    tags.extend(self.append.iter().cloned());
                    modified = true;
                }
            }
        }

        if !self.emphasize.is_empty() {
            let mut front = Vec::new();
            for wanted in &self.emphasize {
                front.extend(tags.iter().filter(|t| canonical(t) == *wanted).cloned());
            }
            if !front.is_empty() {
                let rest = tags
                    .iter()
                    .filter(|t| !self.emphasize.contains(&canonical(t)))
                    .cloned();
                let reordered: Vec<String> = front.into_iter().chain(rest).collect();
                modified |= reordered != tags;
                tags = reordered;
            }
        }

        if !self.prepend.is_empty() {
            let mut front = self.prepend.clone();
            front.append(&mut tags);
            tags = front;
            modified = true;
        }

        Applied {
            tags: TagSet::from(tags),
            modified,
        }
    }
}

fn clean(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply `rules` to `tags`, returning the new set and whether anything changed
#[must_use]
pub fn apply(tags: &TagSet, rules: &EditRules) -> (TagSet, bool) {
    let Applied { tags, modified } = RuleEngine::new(rules).apply(tags);
    (tags, modified)
}
