//! Filter command - list items whose tags contain given words

use std::path::Path;

use crate::config::TagsmithConfig;
use crate::dataset::{self, DatasetSource, TagExtension};
use crate::tags::parse_list;
use crate::{Result, output};

/// Execute the filter command
///
/// # Errors
/// Returns an error if the folder or a tag file cannot be read.
pub fn execute(
    config: &TagsmithConfig,
    folder: &Path,
    words: &[String],
    exact: bool,
    ext: Option<TagExtension>,
    quiet: bool,
) -> Result<()> {
    let words: Vec<String> = words.iter().flat_map(|w| parse_list(w)).collect();
    let source = config.source(ext);
    let items = source.discover(folder)?;
    let matched = dataset::filter_items(&source, &items, &words, exact)?;

    for item in &matched {
        let tags = source.read_tags(item)?;
        println!("{}", output::item_with_tags(&item.tags_path, tags.tags(), quiet));
    }
    if !quiet {
        println!("\n{} of {} item(s) match", matched.len(), items.len());
    }
    Ok(())
}
