//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Section-aware inspection and editing of .docx documents
#[derive(Parser, Debug)]
#[command(name = "docsect")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding .docsect.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List sections with break type and paragraph count
    Sections {
        /// Document to read
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print paragraph text, of one section or the whole body
    Paragraphs {
        /// Document to read
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Section number (1-based)
        #[arg(short, long)]
        section: Option<usize>,
    },

    /// Show the document as a section tree
    Outline {
        /// Document to read
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Append a paragraph to a section
    Insert {
        /// Document to edit
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Section number (1-based)
        #[arg(short, long)]
        section: usize,
        /// Paragraph text (\t and \n become tab and line break)
        text: String,
        #[command(flatten)]
        edit: EditArgs,
        #[command(flatten)]
        format: FormatArgs,
    },

    /// Remove every paragraph of a section
    Clear {
        /// Document to edit
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Section number (1-based)
        #[arg(short, long)]
        section: usize,
        #[command(flatten)]
        edit: EditArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by editing commands.
#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    /// Record the edit as a tracked change (default from config)
    #[arg(long, overrides_with = "no_track")]
    pub track: bool,
    /// Edit directly even if config enables tracked changes
    #[arg(long, overrides_with = "track")]
    pub no_track: bool,
    /// Write the result here instead of overwriting the input
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

impl EditArgs {
    /// Tracking requested on the command line, falling back to `configured`.
    pub fn track_changes(&self, configured: bool) -> bool {
        match (self.track, self.no_track) {
            (true, _) => true,
            (_, true) => false,
            _ => configured,
        }
    }
}

/// Run formatting overrides for inserted text.
#[derive(Args, Debug, Clone, Default)]
pub struct FormatArgs {
    #[arg(long)]
    pub bold: bool,
    #[arg(long)]
    pub italic: bool,
    #[arg(long)]
    pub underline: bool,
    #[arg(long)]
    pub strike: bool,
    /// Font size in points
    #[arg(long)]
    pub size: Option<f64>,
    /// Font family
    #[arg(long)]
    pub font: Option<String>,
    /// Hex RGB color, e.g. FF0000
    #[arg(long)]
    pub color: Option<String>,
    /// Highlight color name, e.g. yellow
    #[arg(long)]
    pub highlight: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a template config file
    Template,
    /// Show config file locations
    Path,
}
