// CLI module for argument parsing and configuration

use crate::assembly::{check_output_name, DEFAULT_OUTPUT_NAME};
use crate::domain::{DiscoveryOptions, SortBy};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Pdfstack - arrange images in the terminal and stack them into a PDF
///
/// Drag tiles or type page ranks to set the order, then write one image per
/// A4 page.
#[derive(Parser, Debug, Clone)]
#[command(name = "pdfstack")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Image files and/or directories to select
    ///
    /// Files keep the order given; directories contribute their images
    /// sorted by --sort. Defaults to the current directory.
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Output file name without the .pdf extension
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_NAME)]
    pub output_name: String,

    /// Directory the PDF is written to
    ///
    /// Falls back to the saved preference, then the current directory.
    #[arg(short = 'd', long = "dir")]
    pub output_dir: Option<PathBuf>,

    /// Sort images found in directories
    #[arg(short = 's', long = "sort", value_enum, default_value = "name")]
    pub sort_by: SortOrder,

    /// Reverse sort order
    #[arg(short = 'r', long = "reverse", action = ArgAction::SetTrue)]
    pub reverse: bool,

    /// Include hidden files (names starting with .)
    #[arg(long = "hidden", action = ArgAction::SetTrue)]
    pub show_hidden: bool,

    /// Create the PDF immediately without the interactive grid
    #[arg(long = "batch", action = ArgAction::SetTrue)]
    pub batch: bool,

    /// Comma separated page ranks applied before assembly (e.g. "2,1,3")
    #[arg(long = "ranks", requires = "batch")]
    pub ranks: Option<String>,

    /// Open the PDF with the system viewer once it is written
    #[arg(long = "open", action = ArgAction::SetTrue)]
    pub open_after: bool,

    /// Show the welcome dialog even if it was dismissed before
    #[arg(long = "welcome", action = ArgAction::SetTrue)]
    pub show_welcome: bool,

    /// Write logs to this file (interactive mode)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum SortOrder {
    /// Sort by modification date (oldest first)
    Date,
    /// Sort by file name (alphabetical)
    #[default]
    Name,
    /// Sort by file size (smallest first)
    Size,
}

impl From<SortOrder> for SortBy {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Date => SortBy::Date,
            SortOrder::Name => SortBy::Name,
            SortOrder::Size => SortBy::Size,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Splits a rank list on commas, keeping each entry as typed
    pub fn parse_ranks(ranks: &str) -> Vec<String> {
        ranks.split(',').map(|r| r.trim().to_string()).collect()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        for path in &self.paths {
            if !path.exists() {
                return Err(format!("Path does not exist: {}", path.display()));
            }
        }

        if let Some(ref dir) = self.output_dir {
            if !dir.is_dir() {
                return Err(format!(
                    "Output directory does not exist: {}",
                    dir.display()
                ));
            }
        }

        check_output_name(&self.output_name).map_err(|e| e.to_string())?;

        if let Some(ref ranks) = self.ranks {
            if ranks.trim().is_empty() {
                return Err("--ranks needs at least one value".to_string());
            }
        }

        Ok(())
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub paths: Vec<PathBuf>,
    pub output_name: String,
    pub output_dir: Option<PathBuf>,
    pub sort_by: SortOrder,
    pub reverse: bool,
    pub show_hidden: bool,
    pub batch: bool,
    pub ranks: Option<Vec<String>>,
    pub open_after: bool,
    pub show_welcome: bool,
    pub log_file: Option<PathBuf>,
    pub verbose: u8,
}

impl AppConfig {
    /// Options used when a selected path is a directory
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            show_hidden: self.show_hidden,
            sort_by: self.sort_by.into(),
            reverse: self.reverse,
        }
    }
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig {
            ranks: args.ranks.as_deref().map(Args::parse_ranks),
            paths: args.paths,
            output_name: args.output_name,
            output_dir: args.output_dir,
            sort_by: args.sort_by,
            reverse: args.reverse,
            show_hidden: args.show_hidden,
            batch: args.batch,
            open_after: args.open_after,
            show_welcome: args.show_welcome,
            log_file: args.log_file,
            verbose: args.verbose,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            paths: vec![PathBuf::from(".")],
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            output_dir: None,
            sort_by: SortOrder::Name,
            reverse: false,
            show_hidden: false,
            batch: false,
            ranks: None,
            open_after: false,
            show_welcome: false,
            log_file: None,
            verbose: 0,
        }
    }
}
