//! Defines the command-line interface structure using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cuecli",
    version,
    about = "Local prompt library with sensitive-data redaction"
)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub verbose: bool,
    /// Answer yes to every confirmation
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Add a prompt (reads stdin unless a source is given)
    Add {
        name: String,
        /// Read content from a file
        #[arg(long, short = 'f', conflicts_with = "from_clipboard")]
        from_file: Option<PathBuf>,
        /// Read content from the clipboard
        #[arg(long, short = 'c')]
        from_clipboard: bool,
        /// Tags for the prompt
        #[arg(long, short = 't', num_args = 1..)]
        tags: Vec<String>,
        /// Overwrite an existing prompt without asking
        #[arg(long)]
        force: bool,
    },
    /// Retrieve a prompt (copied to the clipboard by default)
    Get {
        name: String,
        /// Variable assignments in KEY=VALUE format
        #[arg(long = "var")]
        vars: Vec<String>,
        /// Skip sanitization
        #[arg(long)]
        raw: bool,
        /// Only report sensitive data, output nothing
        #[arg(long)]
        scan_only: bool,
        /// Print to stdout
        #[arg(long, group = "target")]
        stdout: bool,
        /// Write to a file
        #[arg(long, group = "target")]
        file: Option<PathBuf>,
        /// Append to a file
        #[arg(long, group = "target")]
        append: Option<PathBuf>,
        /// Show the first lines with line numbers
        #[arg(long, group = "target")]
        preview: bool,
        /// Number of lines shown by --preview
        #[arg(long, default_value_t = 10, requires = "preview")]
        lines: usize,
        /// Print in a specific format
        #[arg(long, short = 'o', value_enum, group = "target")]
        output: Option<OutputFormat>,
        /// Run the prompt as a shell command after confirmation
        #[arg(long, short = 'x')]
        execute: bool,
    },
    /// List prompts
    #[command(visible_alias = "ls")]
    List {
        /// Only prompts carrying any of these tags
        #[arg(long, short = 't', num_args = 1..)]
        tags: Vec<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a prompt in an external editor
    Edit {
        name: String,
        /// Editor command to use
        #[arg(long, short = 'e')]
        editor: Option<String>,
    },
    /// Delete a prompt
    #[command(visible_alias = "rm")]
    Delete { name: String },
    /// Export prompts (sanitized by default)
    Export {
        /// Output file; stdout when omitted
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[arg(long, short = 'f', value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Only these prompts
        #[arg(long, short = 'p', num_args = 1..)]
        prompts: Vec<String>,
        /// Skip sanitization
        #[arg(long)]
        raw: bool,
        /// Overwrite the output file without asking
        #[arg(long)]
        force: bool,
    },
    /// Import prompts from an export file
    Import {
        file: PathBuf,
        /// Merge into existing prompts (tags are combined)
        #[arg(long, conflicts_with = "overwrite")]
        merge: bool,
        /// Replace existing prompts
        #[arg(long)]
        overwrite: bool,
    },
    /// Report sensitive data in a prompt without changing it
    Scan {
        name: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List document backups
    Backups,
    /// Restore the document from a backup
    Restore {
        /// Backup file name, as shown by `backups`
        backup: String,
    },
    /// Show or set a document setting
    Config {
        key: Option<String>,
        /// JSON value (plain text is stored as a string)
        value: Option<String>,
    },
    /// Start an interactive session (REPL)
    Interactive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Html,
    Base64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
    Yaml,
    Minimal,
}
