//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for tagsmith using the `clap` crate.
//!
//! # Commands
//!
//! - **apply**: Run remove / replace / append / emphasize / prepend rules over a folder
//! - **process**: Run several steps in a fixed order (rules, randomize, renumber,
//!   consolidate, redundancy removal, replacement)
//! - **frequency**: Rank tags by occurrence
//! - **renumber**: Rename image/tag pairs into a contiguous numeric sequence
//! - **redundancy** / **randomize** / **consolidate**: Single whole-set transforms
//! - **filter**: List items whose tags contain given words
//! - **config**: Read and change settings
//!
//! Tag lists on the command line are comma-separated, e.g. `--remove "blurry, lowres"`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::Result;
use crate::dataset::TagExtension;
use crate::prompts;
use crate::rules::EditRules;
use crate::tags::parse_list;

/// Output format of the frequency report
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// `tag: count` lines
    #[default]
    Text,
    Csv,
    Json,
}

/// Rule flags shared by `apply` and `process`
#[derive(Args, Debug, Clone, Default)]
pub struct RuleArgs {
    /// Load rules from a TOML or JSON file; flags below override its fields
    #[arg(short = 'r', long = "rules", value_name = "FILE")]
    pub rules_file: Option<PathBuf>,

    /// Tags to remove
    #[arg(long, value_name = "TAGS")]
    pub remove: Option<String>,

    /// Tags to replace
    #[arg(long = "replace-from", value_name = "TAGS")]
    pub replace_from: Option<String>,

    /// Replacement values, paired by position (a single value replaces every tag)
    #[arg(long = "replace-to", value_name = "TAGS")]
    pub replace_to: Option<String>,

    /// Tags to append
    #[arg(short = 'a', long, value_name = "TAGS")]
    pub append: Option<String>,

    /// Insert appended tags right after this tag instead of at the end
    #[arg(long, value_name = "TAG")]
    pub anchor: Option<String>,

    /// Tags to move to the front when present
    #[arg(long, value_name = "TAGS")]
    pub emphasize: Option<String>,

    /// Tags to insert at the front
    #[arg(long, value_name = "TAGS")]
    pub prepend: Option<String>,
}

impl RuleArgs {
    /// Build the rule set from the rule file (if any) and the flags
    ///
    /// # Errors
    /// Returns an error if the rule file cannot be read or parsed.
    pub fn to_rules(&self) -> Result<EditRules> {
        let mut rules = match &self.rules_file {
            Some(path) => EditRules::from_file(path)?,
            None => EditRules::default(),
        };
        let lists = [
            (&self.remove, &mut rules.remove),
            (&self.replace_from, &mut rules.replace_from),
            (&self.replace_to, &mut rules.replace_to),
            (&self.append, &mut rules.append),
            (&self.emphasize, &mut rules.emphasize),
            (&self.prepend, &mut rules.prepend),
        ];
        for (flag, field) in lists {
            if let Some(text) = flag {
                *field = parse_list(text);
            }
        }
        if let Some(anchor) = &self.anchor {
            rules.anchor = Some(anchor.clone());
        }
        Ok(rules)
    }
}

/// Execution flags shared by commands that rewrite tag files
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct BatchArgs {
    /// Process files in parallel
    #[arg(short = 'p', long)]
    pub parallel: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Options of the `prompts` command
#[derive(Args, Debug, Clone)]
pub struct PromptArgs {
    /// Dataset tags drawn per prompt (1-50)
    #[arg(short = 't', long = "tags", value_name = "N", default_value_t = prompts::DEFAULT_TAG_COUNT)]
    pub tags: usize,

    /// Number of prompts to write (10-65535)
    #[arg(short = 'c', long, value_name = "N", default_value_t = prompts::DEFAULT_PROMPT_COUNT)]
    pub count: usize,

    /// Tags placed at the start of every prompt
    #[arg(long, value_name = "TAGS", default_value = "")]
    pub prepend: String,

    /// Tags placed at the end of every prompt
    #[arg(short = 'a', long, value_name = "TAGS", default_value = prompts::DEFAULT_APPEND)]
    pub append: String,

    /// Print a single prompt instead of writing a file
    #[arg(long)]
    pub single: bool,

    /// Folder to write the prompt file to (defaults to the dataset folder)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Seed for a reproducible set of prompts
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key=value (e.g., quiet=true)
        #[arg(value_name = "KEY=VALUE")]
        setting: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to retrieve (e.g., `tag_extension`)
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Print the config file location
    Path,
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "tagsmith")]
#[command(about = "Batch tag editor for image/caption datasets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// More diagnostic output (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this config file instead of the default location
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Tag file extension (overrides config)
    #[arg(short = 'e', long = "ext", value_enum, global = true)]
    pub ext: Option<TagExtension>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Apply edit rules to every tag file in a folder
    #[command(visible_alias = "a")]
    Apply {
        /// Dataset folder
        folder: PathBuf,

        #[command(flatten)]
        rules: RuleArgs,

        #[command(flatten)]
        batch: BatchArgs,

        /// Show what would change without writing
        #[arg(short = 'n', long = "dry-run")]
        dry_run: bool,
    },

    /// Run several processing steps in order
    #[command(visible_alias = "p")]
    Process {
        /// Dataset folder
        folder: PathBuf,

        /// Apply edit rules
        #[arg(long = "apply-rules")]
        apply_rules: bool,

        /// Shuffle tags within each file
        #[arg(long)]
        randomize: bool,

        /// Renumber image/tag pairs
        #[arg(long)]
        renumber: bool,

        /// Drop duplicate tags within each file
        #[arg(long)]
        consolidate: bool,

        /// Drop tags contained in longer tags
        #[arg(long = "remove-redundant")]
        remove_redundant: bool,

        /// Run the replacement rules as a final step
        #[arg(long)]
        replace: bool,

        /// First number when renumbering (overrides config)
        #[arg(short = 's', long = "start", value_name = "N")]
        start: Option<u64>,

        #[command(flatten)]
        rules: RuleArgs,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Rank tags by how often they occur
    #[command(visible_alias = "f")]
    Frequency {
        /// Dataset folder
        folder: PathBuf,

        /// Show only the N most frequent tags (overrides config)
        #[arg(short = 'l', long, value_name = "N")]
        limit: Option<usize>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t)]
        format: ReportFormat,

        /// Write the report to a file instead of stdout
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rename image/tag pairs into a contiguous numeric sequence
    Renumber {
        /// Dataset folder
        folder: PathBuf,

        /// First number (overrides config)
        #[arg(short = 's', long = "start", value_name = "N")]
        start: Option<u64>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Drop tags whose words are contained in a longer tag of the same file
    Redundancy {
        /// Dataset folder
        folder: PathBuf,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Shuffle the tags of every file
    Randomize {
        /// Dataset folder
        folder: PathBuf,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Drop duplicate tags within every file
    Consolidate {
        /// Dataset folder
        folder: PathBuf,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// List items whose tags contain all given words
    Filter {
        /// Dataset folder
        folder: PathBuf,

        /// Words to look for (comma-separated or repeated)
        #[arg(required = true, value_name = "WORDS")]
        words: Vec<String>,

        /// Match whole tags only
        #[arg(short = 'x', long)]
        exact: bool,
    },

    /// Generate random prompts from the tags of a dataset
    Prompts {
        /// Dataset folder
        folder: PathBuf,

        #[command(flatten)]
        options: PromptArgs,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Tracing filter directive for the verbosity flags
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
