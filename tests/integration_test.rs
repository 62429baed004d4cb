//! Integration tests for tagsmith
//!
//! These tests build temporary dataset folders and run complete workflows
//! through the public library API.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tagsmith::batch::{BatchProcessor, CancelToken, ExecutionMode, NoProgress, Operation, spawn};
use tagsmith::commands::process::{Pipeline, ProcessStep};
use tagsmith::config::{ProcessDefaults, TagsmithConfig};
use tagsmith::dataset::{self, DatasetSource, FolderSource, TagExtension};
use tagsmith::frequency;
use tagsmith::prompts::{self, PromptGenerator};
use tagsmith::rules::{EditRules, TagTransform};
use tagsmith::status::{MemoryLog, Severity};
use tagsmith::{ErrorKind, TagSet, TagsmithError};
use tempfile::TempDir;

/// Helper function to create a dataset folder with `(stem, tags)` items
fn setup_dataset(items: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (stem, tags) in items {
        fs::write(dir.path().join(format!("{stem}.png")), b"png").unwrap();
        fs::write(dir.path().join(format!("{stem}.txt")), tags).unwrap();
    }
    dir
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_apply_rules_over_folder() {
    let dir = setup_dataset(&[
        ("1", "1girl, solo, blurry, smile"),
        ("2", "1boy, BLURRY, dog"),
        ("3", "landscape"),
    ]);
    let rules = EditRules::from_lists("blurry", "dog", "puppy", "masterpiece", "");
    let result = BatchProcessor::new(FolderSource::default())
        .run(
            dir.path(),
            &Operation::ApplyRules(rules),
            &NoProgress,
            &CancelToken::new(),
        )
        .unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.modified(), 3);
    assert_eq!(read(dir.path(), "1.txt"), "1girl, solo, smile, masterpiece");
    assert_eq!(read(dir.path(), "2.txt"), "1boy, puppy, masterpiece");
    assert_eq!(read(dir.path(), "3.txt"), "landscape, masterpiece");
}

#[test]
fn test_anchored_append_skips_files_without_anchor() {
    let dir = setup_dataset(&[("1", "1girl, smile"), ("2", "landscape")]);
    let rules = EditRules::from_lists("", "", "", "solo", "1girl");
    let result = BatchProcessor::new(FolderSource::default())
        .run(
            dir.path(),
            &Operation::ApplyRules(rules),
            &NoProgress,
            &CancelToken::new(),
        )
        .unwrap();

    assert_eq!(result.modified(), 1);
    assert_eq!(read(dir.path(), "1.txt"), "1girl, solo, smile");
    assert_eq!(read(dir.path(), "2.txt"), "landscape");
}

#[test]
fn test_unreadable_tag_file_does_not_stop_batch() {
    let dir = setup_dataset(&[("1", "a"), ("2", "a"), ("4", "a"), ("5", "a")]);
    // A directory where the tag file should be cannot be read as text
    fs::write(dir.path().join("3.png"), b"png").unwrap();
    fs::create_dir(dir.path().join("3.txt")).unwrap();

    let log = Arc::new(MemoryLog::new());
    let result = BatchProcessor::new(FolderSource::default())
        .with_log(log.clone())
        .run(
            dir.path(),
            &Operation::ApplyRules(EditRules::from_lists("", "", "", "b", "")),
            &NoProgress,
            &CancelToken::new(),
        )
        .unwrap();

    assert_eq!(result.succeeded(), 4);
    assert_eq!(result.error_count(), 1);
    let (path, failure) = result.errors().next().unwrap();
    assert_eq!(path, &dir.path().join("3.txt"));
    assert_eq!(failure.kind, ErrorKind::Io);
    assert_eq!(read(dir.path(), "5.txt"), "a, b");
    assert!(log.messages(Severity::Error)[0].starts_with("Error processing file 3.txt"));
}

#[test]
fn test_caption_extension() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("1.jpg"), b"jpg").unwrap();
    fs::write(dir.path().join("1.caption"), "a, b").unwrap();
    fs::write(dir.path().join("1.txt"), "untouched").unwrap();

    BatchProcessor::new(FolderSource::new(TagExtension::Caption))
        .run(
            dir.path(),
            &Operation::ApplyRules(EditRules::from_lists("a", "", "", "", "")),
            &NoProgress,
            &CancelToken::new(),
        )
        .unwrap();

    assert_eq!(read(dir.path(), "1.caption"), "b");
    assert_eq!(read(dir.path(), "1.txt"), "untouched");
}

#[test]
fn test_parallel_matches_sequential() {
    let items: Vec<(String, String)> = (1..=40)
        .map(|i| (i.to_string(), format!("tag{i}, hair, long hair, Hair")))
        .collect();
    let borrowed: Vec<(&str, &str)> = items
        .iter()
        .map(|(s, t)| (s.as_str(), t.as_str()))
        .collect();
    let seq_dir = setup_dataset(&borrowed);
    let par_dir = setup_dataset(&borrowed);

    let op = Operation::Transform(TagTransform::Consolidate);
    let seq = BatchProcessor::new(FolderSource::default())
        .run(seq_dir.path(), &op, &NoProgress, &CancelToken::new())
        .unwrap();
    let par = BatchProcessor::new(FolderSource::default())
        .with_mode(ExecutionMode::Parallel)
        .run(par_dir.path(), &op, &NoProgress, &CancelToken::new())
        .unwrap();

    assert_eq!(seq.modified(), 40);
    assert_eq!(par.modified(), 40);
    let seq_paths: Vec<_> = seq.outcomes.iter().map(|o| o.path.file_name()).collect();
    let par_paths: Vec<_> = par.outcomes.iter().map(|o| o.path.file_name()).collect();
    assert_eq!(seq_paths, par_paths);
    assert_eq!(read(par_dir.path(), "7.txt"), "tag7, hair, long hair");
}

#[test]
fn test_background_batch() {
    let dir = setup_dataset(&[("1", "a, a"), ("2", "b")]);
    let handle = spawn(
        BatchProcessor::new(FolderSource::default()),
        dir.path().to_path_buf(),
        Operation::Transform(TagTransform::Consolidate),
    );
    let steps = handle.events().iter().count();
    let result = handle.wait().unwrap();
    assert_eq!(steps, 3);
    assert_eq!(result.modified(), 1);
    assert_eq!(read(dir.path(), "1.txt"), "a");
}

#[test]
fn test_frequency_over_folder() {
    let dir = setup_dataset(&[
        ("1", "Smile, tree"),
        ("2", "smile, ocean"),
        ("3", "tree, smile"),
    ]);
    let report = frequency::analyze_folder(&FolderSource::default(), dir.path()).unwrap();
    assert_eq!(report.files, 3);
    assert_eq!(report.to_lines(), vec!["Smile: 3", "tree: 2", "ocean: 1"]);

    let again = frequency::analyze_folder(&FolderSource::default(), dir.path()).unwrap();
    assert_eq!(report, again);
}

#[test]
fn test_renumber_keeps_pairs_together() {
    let dir = setup_dataset(&[("5", "five"), ("2", "two"), ("9", "nine")]);
    let report = dataset::renumber(&FolderSource::default(), dir.path(), 1, &NoProgress).unwrap();

    assert_eq!(report.pairs, 3);
    assert_eq!(
        names(dir.path()),
        vec!["1.png", "1.txt", "2.png", "2.txt", "3.png", "3.txt"]
    );
    assert_eq!(read(dir.path(), "1.txt"), "two");
    assert_eq!(read(dir.path(), "2.txt"), "five");
    assert_eq!(read(dir.path(), "3.txt"), "nine");
}

#[test]
fn test_renumber_rejects_non_numeric_names_before_renaming() {
    let dir = setup_dataset(&[("5", "five"), ("cover", "c")]);
    let before = names(dir.path());
    let err = dataset::renumber(&FolderSource::default(), dir.path(), 1, &NoProgress).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(names(dir.path()), before);
}

#[test]
fn test_process_pipeline_end_to_end() {
    let dir = setup_dataset(&[
        ("10", "smile, blurry, hair, long hair, smile"),
        ("20", "dog, blurry"),
    ]);
    let steps = ProcessDefaults {
        apply_rules: true,
        renumber: true,
        consolidate: true,
        remove_redundant: true,
        ..ProcessDefaults::default()
    };
    let rules = EditRules::from_lists("blurry", "", "", "", "");
    let report = Pipeline::new(steps, rules, 100)
        .run(
            &BatchProcessor::new(FolderSource::default()),
            dir.path(),
            &NoProgress,
            &CancelToken::new(),
        )
        .unwrap();

    assert!(!report.cancelled);
    assert_eq!(
        report.steps.iter().map(|s| s.step).collect::<Vec<_>>(),
        vec![
            ProcessStep::ApplyRules,
            ProcessStep::Renumber,
            ProcessStep::Consolidate,
            ProcessStep::RemoveRedundant
        ]
    );
    assert_eq!(read(dir.path(), "100.txt"), "smile, long hair");
    assert_eq!(read(dir.path(), "101.txt"), "dog");
}

#[test]
fn test_config_drives_source() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "tag_extension = \"caption\"\nimage_extensions = [\"webp\"]\n",
    )
    .unwrap();
    let config = TagsmithConfig::load(Some(&config_path)).unwrap();

    let data = TempDir::new().unwrap();
    fs::write(data.path().join("1.webp"), b"webp").unwrap();
    fs::write(data.path().join("2.png"), b"png").unwrap();
    let items = config.source(None).discover(data.path()).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].tags_path, data.path().join("1.caption"));

    let txt: PathBuf = config
        .source(Some(TagExtension::Txt))
        .discover(data.path())
        .unwrap()[0]
        .tags_path
        .clone();
    assert_eq!(txt, data.path().join("1.txt"));
}

#[test]
fn test_missing_folder_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = BatchProcessor::new(FolderSource::default())
        .run(
            &dir.path().join("missing"),
            &Operation::Transform(TagTransform::Randomize),
            &NoProgress,
            &CancelToken::new(),
        )
        .unwrap_err();
    assert!(matches!(err, TagsmithError::FolderNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_tag_set_round_trip_through_file() {
    let dir = setup_dataset(&[("1", " a ,b,, c ")]);
    let source = FolderSource::default();
    let item = &source.discover(dir.path()).unwrap()[0];
    let tags = source.read_tags(item).unwrap();
    assert_eq!(tags, TagSet::parse("A, B, C"));
    source.write_tags(item, &tags).unwrap();
    assert_eq!(read(dir.path(), "1.txt"), "a, b, c");
}

#[test]
fn test_images_sharing_a_stem_are_rejected() {
    let dir = setup_dataset(&[("1", "a, b"), ("2", "c")]);
    fs::write(dir.path().join("1.jpg"), b"jpg").unwrap();

    let err = BatchProcessor::new(FolderSource::default())
        .run(
            dir.path(),
            &Operation::ApplyRules(EditRules::from_lists("", "", "", "c", "")),
            &NoProgress,
            &CancelToken::new(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(read(dir.path(), "1.txt"), "a, b");

    let err = frequency::analyze_folder(&FolderSource::default(), dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_prompts_from_dataset() {
    let dir = setup_dataset(&[
        ("1", "1girl, smile, hair, long hair"),
        ("2", "1boy, smile, tree"),
        ("3", "landscape, tree, sky"),
    ]);
    let report = frequency::analyze_folder(&FolderSource::default(), dir.path()).unwrap();
    let generator = PromptGenerator::new(
        &report,
        &["photo".to_string()],
        &["masterpiece".to_string(), "best quality".to_string()],
        50,
    )
    .unwrap();
    let mut rng = fastrand::Rng::with_seed(17);
    let batch = generator.generate_many(10, &mut rng, &NoProgress, &CancelToken::new());

    let path = dir.path().join(prompts::OUTPUT_FILE_NAME);
    prompts::write_prompts(&path, &batch).unwrap();
    let text = read(dir.path(), prompts::OUTPUT_FILE_NAME);
    assert_eq!(text.lines().count(), 10);
    for line in text.lines() {
        let tags = TagSet::parse(line);
        // hair is always dropped next to long hair
        assert_eq!(tags.len(), 10);
        assert!(!tags.contains("hair"));
        assert_eq!(tags.tags()[0], "photo");
        assert_eq!(&tags.tags()[8..], &["masterpiece", "best quality"]);
    }
}
