use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::diff::Side;

#[derive(Parser)]
#[command(name = "celldiff")]
#[command(version = "0.2.0")]
#[command(about = "A notebook-cell diff viewer with a TUI showing per-cell character-level changes")]
#[command(
    long_about = "celldiff compares two extracted-input text files cell by cell. Rewritten lines \
are highlighted at character granularity, every line is tracked back to its (* Input N *) cell, \
and whole cells can be deleted with automatic renumbering. Defaults to a two-pane TUI; JSON and \
plain-text modes are available for scripting."
)]
pub struct Cli {
    /// Base (left) extracted-inputs file
    #[arg(value_name = "LEFT", help = "Path to the base input file")]
    pub left: PathBuf,

    /// Comparison (right) extracted-inputs file
    #[arg(value_name = "RIGHT", help = "Path to the comparison input file")]
    pub right: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "tui", help = "Output format")]
    pub output: OutputFormat,

    /// Side rendered in text mode
    #[arg(short, long, default_value = "left", help = "Side to render in text mode")]
    pub side: Side,

    /// Re-read inputs when they change on disk (non-TUI modes)
    #[arg(short, long, help = "Keep running and re-render when an input changes")]
    pub watch: bool,

    /// Write a plain-text report to this path and exit
    #[arg(long, value_name = "PATH", help = "Export a report instead of rendering")]
    pub export: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colors in output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Two-pane terminal user interface (default)
    Tui,
    /// JSON rendering model for scripting
    Json,
    /// Plain text with change markers
    Text,
}

impl Cli {
    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn validate(&self) -> Result<(), String> {
        for path in [&self.left, &self.right] {
            if !path.exists() {
                return Err(format!("Input file does not exist: {}", path.display()));
            }
            if !path.is_file() {
                return Err(format!("Input path is not a file: {}", path.display()));
            }
        }

        Ok(())
    }
}
