//! Prompts command - random prompts built from dataset tags

use std::path::Path;

use fastrand::Rng;

use crate::batch::CancelToken;
use crate::cli::PromptArgs;
use crate::config::TagsmithConfig;
use crate::dataset::TagExtension;
use crate::prompts::{
    OUTPUT_FILE_NAME, PROMPT_COUNT_RANGE, PromptGenerator, TAG_COUNT_RANGE, clamp_prompt_count,
    write_prompts,
};
use crate::status::{ConsoleLog, StatusLog};
use crate::tags::parse_list;
use crate::{Result, TagsmithError, frequency, output};

/// Execute the prompts command
///
/// Out-of-range counts are clamped with a warning.
///
/// # Errors
/// Returns an error if the dataset cannot be read, has no usable tags, the
/// output folder is missing, or the prompt file cannot be written.
pub fn execute(
    config: &TagsmithConfig,
    folder: &Path,
    args: &PromptArgs,
    ext: Option<TagExtension>,
    quiet: bool,
) -> Result<()> {
    let log = ConsoleLog::new(quiet);
    let report = frequency::analyze_folder(&config.source(ext), folder)?;
    let generator = PromptGenerator::new(
        &report,
        &parse_list(&args.prepend),
        &parse_list(&args.append),
        args.tags,
    )?;
    if !TAG_COUNT_RANGE.contains(&args.tags) {
        log.warning(&format!(
            "Tags per prompt must be between {} and {}; using {}",
            TAG_COUNT_RANGE.start(),
            TAG_COUNT_RANGE.end(),
            generator.tag_count()
        ));
    }
    let mut rng = args.seed.map_or_else(Rng::new, Rng::with_seed);

    if args.single {
        println!("{}", generator.generate(&mut rng));
        return Ok(());
    }

    let count = clamp_prompt_count(args.count);
    if count != args.count {
        log.warning(&format!(
            "Number of prompts must be between {} and {}; using {count}",
            PROMPT_COUNT_RANGE.start(),
            PROMPT_COUNT_RANGE.end()
        ));
    }
    let dir = args.output.as_deref().unwrap_or(folder);
    if !dir.is_dir() {
        return Err(TagsmithError::FolderNotFound(dir.to_path_buf()));
    }
    let path = dir.join(OUTPUT_FILE_NAME);

    let bar = output::BarProgress::new(output::progress_bar("Prompts", quiet));
    let prompts = generator.generate_many(count, &mut rng, &bar, &CancelToken::new());
    bar.finish();
    write_prompts(&path, &prompts)?;
    log.info(&format!(
        "Wrote {} prompt(s) from {} dataset tag(s) to {}",
        prompts.len(),
        report.len(),
        path.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestDataset;
    use std::fs;
    use tempfile::TempDir;

    fn args() -> PromptArgs {
        PromptArgs {
            tags: 2,
            count: 3,
            prepend: String::new(),
            append: "masterpiece".into(),
            single: false,
            output: None,
            seed: Some(1),
        }
    }

    #[test]
    fn test_writes_clamped_number_of_prompts() {
        let ds = TestDataset::new();
        ds.add_item("1", "cat, tree");
        ds.add_item("2", "dog, sky");
        execute(&TagsmithConfig::default(), ds.path(), &args(), None, true).unwrap();

        let text = fs::read_to_string(ds.path().join(OUTPUT_FILE_NAME)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        for line in lines {
            let tags: Vec<&str> = line.split(", ").collect();
            assert_eq!(tags.len(), 3);
            assert_eq!(tags[2], "masterpiece");
        }
    }

    #[test]
    fn test_same_seed_same_prompts() {
        let ds = TestDataset::new();
        ds.add_item("1", "a, b, c, d, e, f");
        let out_a = TempDir::new().unwrap();
        let out_b = TempDir::new().unwrap();
        for out in [&out_a, &out_b] {
            let options = PromptArgs {
                output: Some(out.path().to_path_buf()),
                ..args()
            };
            execute(&TagsmithConfig::default(), ds.path(), &options, None, true).unwrap();
        }
        let read = |d: &TempDir| fs::read_to_string(d.path().join(OUTPUT_FILE_NAME)).unwrap();
        assert_eq!(read(&out_a), read(&out_b));
        assert!(!ds.exists(OUTPUT_FILE_NAME));
    }

    #[test]
    fn test_missing_output_folder() {
        let ds = TestDataset::new();
        ds.add_item("1", "a");
        let options = PromptArgs {
            output: Some(ds.path().join("missing")),
            ..args()
        };
        let err = execute(&TagsmithConfig::default(), ds.path(), &options, None, true).unwrap_err();
        assert!(matches!(err, TagsmithError::FolderNotFound(_)));
    }
}
