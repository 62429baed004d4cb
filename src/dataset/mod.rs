//! Dataset folders
//!
//! A dataset item is an image plus a sibling tag file with the same base name.
//! [`DatasetSource`] is the file-enumeration seam used by the batch processor;
//! [`FolderSource`] is the filesystem implementation.
//!
//! Items are always returned in a stable order: numeric base names first, in
//! ascending numeric order, then the remaining names lexically.

pub mod numbering;

pub use numbering::{RenumberReport, renumber};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tags::{TagSet, canonical};
use crate::{Result, TagsmithError};

/// Image extensions recognised by default (lower-case, without the dot)
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Extensions a tag file may use
pub const TAG_EXTENSIONS: &[&str] = &["txt", "caption"];

/// Which tag file of an item is read and written
#[derive(ValueEnum, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagExtension {
    /// `<name>.txt`
    #[default]
    Txt,
    /// `<name>.caption`
    Caption,
}

impl TagExtension {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Caption => "caption",
        }
    }
}

/// One image and the tag file that belongs to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetItem {
    pub image: PathBuf,
    /// Path of the tag file; it may not exist yet
    pub tags_path: PathBuf,
}

impl DatasetItem {
    #[must_use]
    pub fn new(image: PathBuf, extension: TagExtension) -> Self {
        let tags_path = image.with_extension(extension.as_str());
        Self { image, tags_path }
    }

    /// Base name of the image without extension
    #[must_use]
    pub fn stem(&self) -> String {
        self.image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Base name parsed as a number, if it is one
    #[must_use]
    pub fn number(&self) -> Option<u64> {
        numeric_stem(&self.image)
    }
}

/// Parse the base name of `path` as a non-negative integer.
///
/// Only plain ASCII digits count; signs and whitespace do not.
#[must_use]
pub fn numeric_stem(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Numeric-then-lexical ordering of paths by base name
#[must_use]
pub fn compare_paths(a: &Path, b: &Path) -> Ordering {
    match (numeric_stem(a), numeric_stem(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.file_name().cmp(&b.file_name()),
    }
}

/// Sort items into the stable processing order
pub fn sort_items(items: &mut [DatasetItem]) {
    items.sort_by(|a, b| compare_paths(&a.image, &b.image));
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// Fail if two items would read and write the same tag file
fn ensure_distinct_tag_files(items: &[DatasetItem]) -> Result<()> {
    let mut owners: HashMap<&Path, &Path> = HashMap::with_capacity(items.len());
    for item in items {
        if let Some(previous) = owners.insert(&item.tags_path, &item.image) {
            let name = |p: &Path| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            };
            return Err(TagsmithError::Validation(format!(
                "Images '{}' and '{}' share the tag file '{}'",
                name(previous),
                name(&item.image),
                name(&item.tags_path)
            )));
        }
    }
    Ok(())
}

/// File-enumeration and tag-file access for a dataset
pub trait DatasetSource: Sync {
    /// List the items of `folder` in processing order.
    ///
    /// Every item owns a distinct tag file.
    ///
    /// # Errors
    /// `FolderNotFound` if the folder is missing, `EmptyFolder` if it holds no files,
    /// `NoFilesFound` if it holds files but no images, `Validation` if two images
    /// share a base name, `Io` on listing failures.
    fn discover(&self, folder: &Path) -> Result<Vec<DatasetItem>>;

    /// Read the tags of an item. A missing tag file reads as an empty set.
    ///
    /// # Errors
    /// Returns `TagsmithError::Io` if the tag file exists but cannot be read.
    fn read_tags(&self, item: &DatasetItem) -> Result<TagSet>;

    /// Replace the tag file of an item
    ///
    /// # Errors
    /// Returns `TagsmithError::Io` if the tag file cannot be written.
    fn write_tags(&self, item: &DatasetItem, tags: &TagSet) -> Result<()>;
}

/// Dataset stored as plain files in one folder
#[derive(Debug, Clone)]
pub struct FolderSource {
    extension: TagExtension,
    image_extensions: Vec<String>,
}

impl FolderSource {
    #[must_use]
    pub fn new(extension: TagExtension) -> Self {
        Self {
            extension,
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
        }
    }

    /// Override the recognised image extensions
    #[must_use]
    pub fn with_image_extensions(mut self, extensions: &[String]) -> Self {
        if !extensions.is_empty() {
            self.image_extensions = extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect();
        }
        self
    }

    #[must_use]
    pub const fn extension(&self) -> TagExtension {
        self.extension
    }

    #[must_use]
    pub fn is_image(&self, path: &Path) -> bool {
        has_extension(path, &self.image_extensions)
    }
}

impl Default for FolderSource {
    fn default() -> Self {
        Self::new(TagExtension::default())
    }
}

impl DatasetSource for FolderSource {
    fn discover(&self, folder: &Path) -> Result<Vec<DatasetItem>> {
        if !folder.is_dir() {
            return Err(TagsmithError::FolderNotFound(folder.to_path_buf()));
        }
        let entries = fs::read_dir(folder).map_err(|e| TagsmithError::io(folder, e))?;

        let mut any_file = false;
        let mut items = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| TagsmithError::io(folder, e))?.path();
            if !path.is_file() {
                continue;
            }
            any_file = true;
            if self.is_image(&path) {
                items.push(DatasetItem::new(path, self.extension));
            }
        }

        if !any_file {
            return Err(TagsmithError::EmptyFolder(folder.to_path_buf()));
        }
        if items.is_empty() {
            return Err(TagsmithError::NoFilesFound(folder.to_path_buf()));
        }
        sort_items(&mut items);
        ensure_distinct_tag_files(&items)?;
        debug!(folder = %folder.display(), count = items.len(), "discovered dataset items");
        Ok(items)
    }

    fn read_tags(&self, item: &DatasetItem) -> Result<TagSet> {
        match fs::read_to_string(&item.tags_path) {
            Ok(text) => Ok(TagSet::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TagSet::new()),
            Err(e) => Err(TagsmithError::io(&item.tags_path, e)),
        }
    }

    fn write_tags(&self, item: &DatasetItem, tags: &TagSet) -> Result<()> {
        fs::write(&item.tags_path, tags.to_line()).map_err(|e| TagsmithError::io(&item.tags_path, e))
    }
}

/// Keep the items whose tags match every word in `words`.
///
/// With `exact`, a word must equal a whole tag; otherwise it may appear anywhere
/// inside a tag. Matching ignores case. An empty word list keeps every item.
///
/// # Errors
/// Returns the first tag-file read error.
pub fn filter_items(
    source: &dyn DatasetSource,
    items: &[DatasetItem],
    words: &[String],
    exact: bool,
) -> Result<Vec<DatasetItem>> {
    let wanted: Vec<String> = words.iter().map(|w| canonical(w.trim())).collect();
    let mut matched = Vec::new();
    for item in items {
        let tags = source.read_tags(item)?;
        let lowered: Vec<String> = tags.iter().map(|t| canonical(t)).collect();
        let hit = wanted.iter().all(|w| {
            if exact {
                lowered.iter().any(|t| t == w)
            } else {
                lowered.iter().any(|t| t.contains(w.as_str()))
            }
        });
        if hit {
            matched.push(item.clone());
        }
    }
    Ok(matched)
}
