//! CLI argument definitions: top-level `Cli` struct and `Commands` enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub(crate) const CLI_LONG_ABOUT: &str =
    "Temporal-oracle pipeline for recorded GUI state graphs.\n\n\
    Typical path:\n  \
    1. loris catalog --basic --out catalog.json\n  \
    2. loris encode graph.json --model-id <id> --catalog catalog.json --out runs/\n  \
    3. loris gen-oracles graph.json --model-id <id> --patterns patterns.csv --out runs/\n  \
    4. review the candidates, then:\n     \
    loris check graph.json --model-id <id> --oracles reviewed.csv --ltl-command <checker> --out runs/";

#[derive(Parser)]
#[command(name = "loris")]
#[command(about = "Temporal-oracle pipeline for recorded GUI state graphs")]
#[command(long_about = CLI_LONG_ABOUT)]
#[command(version)]
pub(crate) struct Cli {
    /// Write artifacts into a timestamped subfolder of the output directory
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) run_subfolder: bool,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Write a default proposition catalog
    #[command(display_order = 10)]
    Catalog {
        /// Output file for the catalog JSON
        #[arg(long, default_value = "PropositionCatalog_default.json")]
        out: PathBuf,

        /// Emit the full rule ladders instead of the minimal existence-only
        /// configuration
        #[arg(long, default_value_t = false)]
        basic: bool,
    },

    /// Build the proposition-encoded temporal model from a recorded graph
    #[command(display_order = 20)]
    Encode {
        /// Path to the exported graph JSON file
        graph: PathBuf,

        /// Identifier of the model inside the graph store
        #[arg(long)]
        model_id: String,

        /// Proposition catalog to apply (defaults to the minimal catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Instrument deadlock states into a shared synthetic terminal state
        #[arg(long, default_value_t = false)]
        instrument_terminal: bool,

        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
    },

    /// Generate oracle candidates from temporal patterns
    #[command(display_order = 30)]
    GenOracles {
        /// Path to the exported graph JSON file
        graph: PathBuf,

        /// Identifier of the model inside the graph store
        #[arg(long)]
        model_id: String,

        /// Pattern table (CSV)
        #[arg(long)]
        patterns: PathBuf,

        /// Optional pattern-constraint table (CSV)
        #[arg(long)]
        constraints: Option<PathBuf>,

        /// Proposition catalog to apply (defaults to the minimal catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Candidates to draw per pattern
        #[arg(long, default_value_t = 3)]
        per_pattern: usize,

        /// Seed for the substitution draws; a fixed seed reproduces the run
        #[arg(long, default_value_t = 5_000_000)]
        seed: u64,

        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
    },

    /// Model-check accepted oracles against the encoded model
    #[command(display_order = 40)]
    Check {
        /// Path to the exported graph JSON file
        graph: PathBuf,

        /// Identifier of the model inside the graph store
        #[arg(long)]
        model_id: String,

        /// Oracle table (CSV) with review statuses
        #[arg(long)]
        oracles: PathBuf,

        /// Proposition catalog to apply (defaults to the minimal catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Instrument deadlock states into a shared synthetic terminal state
        #[arg(long, default_value_t = false)]
        instrument_terminal: bool,

        /// Executable for the LTL backend; omitting it disables the backend
        #[arg(long)]
        ltl_command: Option<String>,

        /// Executable for the CTL backend; omitting it disables the backend
        #[arg(long)]
        ctl_command: Option<String>,

        /// Run checker commands through `sh -c`
        #[arg(long, default_value_t = false)]
        via_shell: bool,

        /// Keep intermediate checker files and extra artifacts
        #[arg(long, default_value_t = false)]
        verbose: bool,

        /// Ask backends for counterexamples on failing oracles
        #[arg(long, default_value_t = false)]
        counterexamples: bool,

        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
    },
}
