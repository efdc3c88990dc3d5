use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "crossfire",
    about = "Crossfire: exchange, reconcile, and score contest tests",
    version
)]
pub struct Cli {
    /// Path to the contest config (relative paths inside resolve against its directory)
    #[arg(
        long,
        global = true,
        env = "CROSSFIRE_CONFIG",
        default_value = "crossfire.toml"
    )]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a contest directory: config, empty registry, locals and reports
    Init {
        /// Directory to initialize
        #[arg(default_value = ".")]
        path: String,
    },

    /// Merge every author's local snapshot into the registry
    Concat {
        /// Publication instant for new tests (RFC 3339, default: now)
        #[arg(long)]
        as_of: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score all run reports and write the leaderboard
    Calculate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check extracted documents against an expectation
    Grade {
        /// Full test text: `<input> <operator> <documents>`
        #[arg(long)]
        expected: String,

        /// Extracted documents, comma-separated `TYPE[+|-]:value`
        #[arg(long, default_value = "")]
        actual: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
