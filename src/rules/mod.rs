//! Edit rules and the per-file tag transformations
//!
//! - `engine`: the ordered remove / replace / append / emphasize / prepend pipeline
//! - `transform`: whole-set rewrites (redundancy removal, randomization, consolidation)
//!
//! [`EditRules`] is a plain value object. It can be built from CLI arguments
//! (comma-separated lists, as typed into the editor) or loaded from a TOML/JSON
//! rule file.

mod engine;
mod transform;

pub use engine::{Applied, RuleEngine, apply};
pub use transform::{TagTransform, consolidate, randomize, remove_redundant, words};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::tags::parse_list;
use crate::{Result, TagsmithError};

/// Set of edits applied to every tag file in a batch.
///
/// Steps run in a fixed order: remove, replace, append, emphasize, prepend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditRules {
    /// Tags to drop (case-insensitive)
    pub remove: Vec<String>,
    /// Tags to look for when replacing, paired by position with `replace_to`
    pub replace_from: Vec<String>,
    /// Replacement values. A single value is broadcast to every `replace_from` entry.
    pub replace_to: Vec<String>,
    /// Tags to insert after `anchor`, or at the end when no anchor is set
    pub append: Vec<String>,
    /// Existing tag after which `append` is inserted
    pub anchor: Option<String>,
    /// Tags moved to the front of the list when present
    pub emphasize: Vec<String>,
    /// Tags inserted at the very front
    pub prepend: Vec<String>,
}

impl EditRules {
    /// Build rules from the comma-separated text inputs of the editor
    #[must_use]
    pub fn from_lists(
        remove: &str,
        replace_from: &str,
        replace_to: &str,
        append: &str,
        anchor: &str,
    ) -> Self {
        let anchor = anchor.trim();
        Self {
            remove: parse_list(remove),
            replace_from: parse_list(replace_from),
            replace_to: parse_list(replace_to),
            append: parse_list(append),
            anchor: (!anchor.is_empty()).then(|| anchor.to_string()),
            ..Self::default()
        }
    }

    /// True when applying these rules can never change a tag set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty()
            && (self.replace_from.is_empty() || self.replace_to.is_empty())
            && self.append.is_empty()
            && self.emphasize.is_empty()
            && self.prepend.is_empty()
    }

    /// Anchor with surrounding whitespace removed, `None` when blank
    #[must_use]
    pub fn anchor(&self) -> Option<&str> {
        self.anchor
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    /// Check the rule combination before a batch touches any file.
    ///
    /// # Errors
    /// Returns `TagsmithError::Validation` when replacement lists are only half given
    /// or a rule value contains the tag delimiter.
    pub fn validate(&self) -> Result<()> {
        if !self.replace_from.is_empty() && self.replace_to.is_empty() {
            return Err(TagsmithError::Validation(
                "Tags to replace were given without replacement values".into(),
            ));
        }
        if self.replace_from.is_empty() && !self.replace_to.is_empty() {
            return Err(TagsmithError::Validation(
                "Replacement values were given without tags to replace".into(),
            ));
        }
        let all = self
            .remove
            .iter()
            .chain(&self.replace_from)
            .chain(&self.replace_to)
            .chain(&self.append)
            .chain(&self.emphasize)
            .chain(&self.prepend)
            .chain(self.anchor.iter());
        for value in all {
            if value.contains(crate::tags::TAG_DELIMITER) {
                return Err(TagsmithError::Validation(format!(
                    "Rule value '{value}' contains a comma; list tags separately"
                )));
            }
        }
        Ok(())
    }

    /// Load rules from a `.toml` or `.json` file
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be read, a parse error if its contents
    /// are malformed, and `TagsmithError::Validation` for unknown extensions.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| TagsmithError::io(path, e))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Err(TagsmithError::Validation(format!(
                "Unsupported rule file '{}': expected .toml or .json",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestDataset;

    #[test]
    fn test_from_lists_parses_editor_input() {
        let rules = EditRules::from_lists("bad, worse", "cat", "dog", "blue, sky", "  ");
        assert_eq!(rules.remove, vec!["bad", "worse"]);
        assert_eq!(rules.replace_from, vec!["cat"]);
        assert_eq!(rules.replace_to, vec!["dog"]);
        assert_eq!(rules.append, vec!["blue", "sky"]);
        assert!(rules.anchor.is_none());
    }

    #[test]
    fn test_default_rules_are_empty() {
        assert!(EditRules::default().is_empty());
        assert!(EditRules::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_half_replacement() {
        let rules = EditRules {
            replace_from: vec!["a".into()],
            ..EditRules::default()
        };
        assert!(rules.validate().is_err());

        let rules = EditRules {
            replace_to: vec!["a".into()],
            ..EditRules::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_delimiter() {
        let rules = EditRules {
            append: vec!["a, b".into()],
            ..EditRules::default()
        };
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("comma"));
    }

    #[test]
    fn test_blank_anchor_is_none() {
        let rules = EditRules {
            anchor: Some("   ".into()),
            ..EditRules::default()
        };
        assert_eq!(rules.anchor(), None);
    }

    #[test]
    fn test_from_toml_file() {
        let ds = TestDataset::new();
        let path = ds.write_file(
            "rules.toml",
            "remove = [\"lowres\"]\nappend = [\"blue\"]\nanchor = \"sky\"\n",
        );
        let rules = EditRules::from_file(&path).unwrap();
        assert_eq!(rules.remove, vec!["lowres"]);
        assert_eq!(rules.anchor(), Some("sky"));
        assert!(rules.replace_from.is_empty());
    }

    #[test]
    fn test_from_json_file() {
        let ds = TestDataset::new();
        let path = ds.write_file(
            "rules.json",
            r#"{"replace_from": ["a", "b"], "replace_to": ["x"]}"#,
        );
        let rules = EditRules::from_file(&path).unwrap();
        assert_eq!(rules.replace_from, vec!["a", "b"]);
        assert_eq!(rules.replace_to, vec!["x"]);
    }

    #[test]
    fn test_from_file_unknown_extension() {
        let ds = TestDataset::new();
        let path = ds.write_file("rules.yaml", "remove: []");
        assert!(matches!(
            EditRules::from_file(&path),
            Err(TagsmithError::Validation(_))
        ));
    }
}
