//! Renumbering of image/tag pairs into a contiguous numeric sequence
//!
//! Every image in the folder must already have a numeric base name. The pairs are
//! sorted by that number and renamed to `start, start + 1, ...`, keeping each
//! file's extension. All validation happens before the first rename, and the
//! renames themselves go through temporary names so that overlapping old and new
//! numbers never clobber each other. A failed rename rolls back the ones already
//! done.
//!
//! A target number is blocked only by an image or tag file outside the batch,
//! such as an orphan `7.caption` that would pair with the renamed image. Other
//! files (`7.json`, `7.md`) never collide.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{FolderSource, TAG_EXTENSIONS, numeric_stem};
use crate::batch::ProgressSink;
use crate::{Result, TagsmithError};

/// Outcome of a renumbering run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenumberReport {
    /// Image/tag pairs in the folder
    pub pairs: usize,
    /// Files whose name changed
    pub renamed_files: usize,
}

impl RenumberReport {
    /// The folder was already numbered as requested
    #[must_use]
    pub const fn already_numbered(&self) -> bool {
        self.renamed_files == 0
    }
}

#[derive(Debug)]
struct Pair {
    number: u64,
    files: Vec<PathBuf>,
}

type Move = (PathBuf, PathBuf);

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_tag_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TAG_EXTENSIONS.iter().any(|t| t.eq_ignore_ascii_case(e)))
}

/// Collect the numbered pairs of `folder`, failing on any naming problem
fn collect_pairs(source: &FolderSource, folder: &Path, files: &[PathBuf]) -> Result<Vec<Pair>> {
    let mut pairs: Vec<Pair> = Vec::new();
    let mut numbers: HashMap<u64, PathBuf> = HashMap::new();

    for image in files.iter().filter(|p| source.is_image(p)) {
        let number = numeric_stem(image).ok_or_else(|| {
            TagsmithError::Validation(format!(
                "File names must be numbers to renumber: '{}'",
                file_name(image)
            ))
        })?;
        if let Some(previous) = numbers.insert(number, image.clone()) {
            return Err(TagsmithError::Validation(format!(
                "Ambiguous number {number}: both '{}' and '{}' use it",
                file_name(&previous),
                file_name(image)
            )));
        }
        let base = stem(image);
        let mut pair_files = vec![image.clone()];
        for ext in TAG_EXTENSIONS {
            let tag_file = folder.join(format!("{base}.{ext}"));
            if tag_file.is_file() {
                pair_files.push(tag_file);
            }
        }
        pairs.push(Pair {
            number,
            files: pair_files,
        });
    }

    pairs.sort_by_key(|p| p.number);
    Ok(pairs)
}

/// Rename `groups` in order, calling `on_group` after each group completes.
/// On failure every rename done so far is undone in reverse order.
fn rename_groups(groups: &[Vec<Move>], mut on_group: impl FnMut()) -> Result<()> {
    let mut done: Vec<&Move> = Vec::new();
    for group in groups {
        for mv in group {
            if let Err(e) = fs::rename(&mv.0, &mv.1) {
                warn!(from = %mv.0.display(), error = %e, "rename failed, rolling back");
                rollback(&done);
                return Err(TagsmithError::io(&mv.0, e));
            }
            done.push(mv);
        }
        on_group();
    }
    Ok(())
}

fn rollback(done: &[&Move]) {
    for (from, to) in done.iter().rev().map(|m| (&m.0, &m.1)) {
        if let Err(e) = fs::rename(to, from) {
            warn!(file = %to.display(), error = %e, "could not undo rename");
        }
    }
}

/// Rename the image/tag pairs of `folder` to `start, start + 1, ...`.
///
/// # Errors
/// - `Validation` if `start` is 0, an image name is not a number, two images share a
///   number, or the sequence would overflow
/// - `NameCollision` if a target name belongs to a file outside the renumbered pairs
/// - `FolderNotFound` / `EmptyFolder` / `NoFilesFound` when there is nothing to rename
/// - `Io` if listing or renaming fails (completed renames are rolled back)
///
/// Nothing is renamed unless every check passes.
pub fn renumber(
    source: &FolderSource,
    folder: &Path,
    start: u64,
    progress: &dyn ProgressSink,
) -> Result<RenumberReport> {
    if start == 0 {
        return Err(TagsmithError::Validation(
            "Starting number must be at least 1".into(),
        ));
    }
    if !folder.is_dir() {
        return Err(TagsmithError::FolderNotFound(folder.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(folder).map_err(|e| TagsmithError::io(folder, e))? {
        let path = entry.map_err(|e| TagsmithError::io(folder, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(TagsmithError::EmptyFolder(folder.to_path_buf()));
    }

    let pairs = collect_pairs(source, folder, &files)?;
    if pairs.is_empty() {
        return Err(TagsmithError::NoFilesFound(folder.to_path_buf()));
    }
    let count = u64::try_from(pairs.len())
        .map_err(|_| TagsmithError::Validation("Too many files".into()))?;
    start.checked_add(count).ok_or_else(|| {
        TagsmithError::Validation(format!("Numbering from {start} would overflow"))
    })?;

    let batch: HashSet<&PathBuf> = pairs.iter().flat_map(|p| &p.files).collect();

    // Image and tag files outside the batch, by base name, for collision checks
    let mut outsiders: HashMap<String, &PathBuf> = HashMap::new();
    for file in files
        .iter()
        .filter(|f| !batch.contains(f) && (source.is_image(f) || is_tag_file(f)))
    {
        outsiders.entry(stem(file)).or_insert(file);
    }

    let mut finals: Vec<Vec<Move>> = Vec::with_capacity(pairs.len());
    for (number, pair) in (start..).zip(&pairs) {
        let target_stem = number.to_string();
        if let Some(other) = outsiders.get(&target_stem) {
            return Err(TagsmithError::NameCollision((*other).clone()));
        }
        let moves = pair
            .files
            .iter()
            .filter_map(|from| {
                let ext = from.extension().map(|e| e.to_string_lossy().into_owned());
                let to = match ext {
                    Some(ext) => folder.join(format!("{target_stem}.{ext}")),
                    None => folder.join(&target_stem),
                };
                (*from != to).then(|| (from.clone(), to))
            })
            .collect();
        finals.push(moves);
    }

    let renamed_files: usize = finals.iter().map(Vec::len).sum();
    if renamed_files == 0 {
        debug!(folder = %folder.display(), "already numbered");
        return Ok(RenumberReport {
            pairs: pairs.len(),
            renamed_files: 0,
        });
    }

    // Phase 1 moves every file out of the way under a temporary name
    let pid = std::process::id();
    let mut temps: Vec<Vec<Move>> = Vec::with_capacity(finals.len());
    let mut second: Vec<Vec<Move>> = Vec::with_capacity(finals.len());
    let mut k = 0usize;
    for group in &finals {
        let mut to_temp = Vec::with_capacity(group.len());
        let mut from_temp = Vec::with_capacity(group.len());
        for (from, to) in group {
            let temp = folder.join(format!(".tagsmith-renumber-{pid}-{k}.tmp"));
            if temp.exists() {
                return Err(TagsmithError::NameCollision(temp));
            }
            k += 1;
            to_temp.push((from.clone(), temp.clone()));
            from_temp.push((temp, to.clone()));
        }
        temps.push(to_temp);
        second.push(from_temp);
    }

    progress.on_total(pairs.len());
    rename_groups(&temps, || {})?;
    if let Err(e) = rename_groups(&second, || progress.on_step()) {
        let undo: Vec<&Move> = temps.iter().flatten().collect();
        rollback(&undo);
        return Err(e);
    }

    debug!(folder = %folder.display(), pairs = pairs.len(), renamed_files, "renumbered");
    Ok(RenumberReport {
        pairs: pairs.len(),
        renamed_files,
    })
}
