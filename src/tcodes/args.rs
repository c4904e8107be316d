use clap::{Parser, Subcommand};
use std::path::PathBuf;

fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "tcodes", bin_name = "tcodes", version = get_version())]
#[command(about = "Search, tag and favorite SAP transaction codes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List transaction codes, favorites first
    #[command(alias = "ls")]
    List {
        /// Free-text search over code, title and description
        search: Option<String>,

        /// Only show codes with this tag (ALL for every visible group)
        #[arg(short, long, default_value = "ALL")]
        tag: String,
    },

    /// Show entry counts per tag
    Counts {
        /// Count only entries matching this search
        search: Option<String>,
    },

    /// Add a custom transaction code
    #[command(alias = "n")]
    Add {
        code: String,

        #[arg(short, long, default_value = "")]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Tags (defaults to CUSTOM)
        #[arg(long = "tag", value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Edit a custom transaction code
    #[command(alias = "e")]
    Edit {
        code: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Replace the tags (omit to keep the current ones)
        #[arg(long = "tag", value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Delete a custom transaction code
    #[command(alias = "rm")]
    Delete { code: String },

    /// Toggle the favorite flag of a code
    #[command(alias = "f")]
    Fav { code: String },

    /// Copy a code to the clipboard using the configured copy option
    #[command(alias = "c")]
    Copy {
        code: String,

        /// Use the alternate prefix (/o instead of /n)
        #[arg(long)]
        alt: bool,

        /// Print only, do not touch the clipboard or open a browser
        #[arg(long)]
        print: bool,
    },

    /// Export settings, custom codes and favorites to a JSON file
    Export {
        /// Output file (defaults to tcodes-<timestamp>.json)
        path: Option<PathBuf>,
    },

    /// Import settings, custom codes and favorites from a JSON file
    Import { path: PathBuf },

    /// Remove all custom codes and favorites
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Get or set configuration
    Config {
        /// Setting key (e.g. copy-option, visible-groups)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Check and fix stored data
    Doctor,
}
