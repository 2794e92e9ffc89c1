//! CLI definitions for PageLens.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// PageLens CLI.
#[derive(Parser)]
#[command(name = "pagelens")]
#[command(about = "Page context extraction and selection replacement")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PAGELENS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON responses
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the page comes from and how it is prepared before the request runs.
#[derive(Args, Clone)]
pub(crate) struct PageArgs {
    /// HTML snapshot to load
    #[arg(long)]
    pub html: PathBuf,

    /// URL the snapshot was taken from
    #[arg(long, default_value = "about:blank")]
    pub url: String,

    /// Focus the first element matching this selector
    #[arg(long)]
    pub focus: Option<String>,

    /// Select the first occurrence of this text (inside the focused control
    /// when --focus names one)
    #[arg(long)]
    pub select: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Extract the full context payload
    Extract {
        #[command(flatten)]
        page: PageArgs,

        /// Only report the selected text
        #[arg(long)]
        selected_text_only: bool,

        /// Skip privacy masking
        #[arg(long)]
        no_masking: bool,
    },

    /// Detect the hosting platform
    Platform {
        #[command(flatten)]
        page: PageArgs,
    },

    /// List the visible error messages
    Errors {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Report the current selection
    Selection {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Capture the selection and replace it with new text
    Replace {
        #[command(flatten)]
        page: PageArgs,

        /// Replacement text
        text: String,

        /// Print the resulting document instead of the result
        #[arg(long)]
        print_html: bool,
    },

    /// Answer JSON requests read from stdin, one per line
    Session {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Validate the configuration file
    Validate,
}
