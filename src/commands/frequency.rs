//! Frequency command - rank tags by occurrence

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cli::ReportFormat;
use crate::config::TagsmithConfig;
use crate::dataset::TagExtension;
use crate::frequency::{self, FrequencyReport};
use crate::{Result, TagsmithError, output};

/// Execute the frequency command
///
/// # Errors
/// Returns an error if the folder or a tag file cannot be read, or the report
/// cannot be written.
pub fn execute(
    config: &TagsmithConfig,
    folder: &Path,
    limit: Option<usize>,
    format: ReportFormat,
    destination: Option<&PathBuf>,
    ext: Option<TagExtension>,
    quiet: bool,
) -> Result<()> {
    let source = config.source(ext);
    let report =
        frequency::analyze_folder(&source, folder)?.limited(limit.or(config.frequency_limit));

    match destination {
        Some(path) => {
            write_report(&report, format, path)?;
            if !quiet {
                println!(
                    "Wrote {} tag(s) from {} file(s) to {}",
                    report.len(),
                    report.files,
                    path.display()
                );
            }
        }
        None => print_report(&report, format, quiet)?,
    }
    Ok(())
}

fn write_report(report: &FrequencyReport, format: ReportFormat, path: &Path) -> Result<()> {
    match format {
        ReportFormat::Text => {
            let mut text = report.to_lines().join("\n");
            text.push('\n');
            fs::write(path, text).map_err(|e| TagsmithError::io(path, e))
        }
        ReportFormat::Csv => {
            let file = fs::File::create(path).map_err(|e| TagsmithError::io(path, e))?;
            report.write_csv(file)
        }
        ReportFormat::Json => {
            fs::write(path, report.to_json()?).map_err(|e| TagsmithError::io(path, e))
        }
    }
}

fn print_report(report: &FrequencyReport, format: ReportFormat, quiet: bool) -> Result<()> {
    match format {
        ReportFormat::Text => {
            if report.is_empty() {
                if !quiet {
                    println!("No tags found.");
                }
                return Ok(());
            }
            if !quiet {
                println!("Tags in {} file(s):", report.files);
            }
            for entry in &report.entries {
                println!("{}", output::tag_with_count(&entry.tag, entry.count, quiet));
            }
            Ok(())
        }
        ReportFormat::Csv => report.write_csv(io::stdout().lock()),
        ReportFormat::Json => {
            println!("{}", report.to_json()?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestDataset;

    fn report() -> FrequencyReport {
        let ds = TestDataset::new();
        ds.add_item("1", "a, b");
        ds.add_item("2", "b");
        frequency::analyze_folder(&TagsmithConfig::default().source(None), ds.path()).unwrap()
    }

    #[test]
    fn test_write_text_report() {
        let out = TestDataset::new();
        let path = out.path().join("freq.txt");
        write_report(&report(), ReportFormat::Text, &path).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "b: 2\na: 1\n");
    }

    #[test]
    fn test_write_csv_report() {
        let out = TestDataset::new();
        let path = out.path().join("freq.csv");
        write_report(&report(), ReportFormat::Csv, &path).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "tag,count\nb,2\na,1\n");
    }

    #[test]
    fn test_write_to_missing_directory_fails_with_path() {
        let out = TestDataset::new();
        let path = out.path().join("nope").join("freq.json");
        let err = write_report(&report(), ReportFormat::Json, &path).unwrap_err();
        assert!(matches!(err, TagsmithError::Io { .. }));
    }
}
