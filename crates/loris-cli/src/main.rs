#![doc = include_str!("../README.md")]

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::check::CheckArgs;
use crate::commands::encode::EncodeArgs;
use crate::commands::gen_oracles::GenOraclesArgs;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Catalog { out, basic } => commands::catalog::run(out, *basic),
        Commands::Encode {
            graph,
            model_id,
            catalog,
            instrument_terminal,
            out,
        } => commands::encode::run(EncodeArgs {
            graph,
            model_id,
            catalog: catalog.as_deref(),
            instrument_terminal: *instrument_terminal,
            out,
            run_subfolder: cli.run_subfolder,
        }),
        Commands::GenOracles {
            graph,
            model_id,
            patterns,
            constraints,
            catalog,
            per_pattern,
            seed,
            out,
        } => commands::gen_oracles::run(GenOraclesArgs {
            graph,
            model_id,
            patterns,
            constraints: constraints.as_deref(),
            catalog: catalog.as_deref(),
            per_pattern: *per_pattern,
            seed: *seed,
            out,
            run_subfolder: cli.run_subfolder,
        }),
        Commands::Check {
            graph,
            model_id,
            oracles,
            catalog,
            instrument_terminal,
            ltl_command,
            ctl_command,
            via_shell,
            verbose,
            counterexamples,
            out,
        } => commands::check::run(CheckArgs {
            graph,
            model_id,
            oracles,
            catalog: catalog.as_deref(),
            instrument_terminal: *instrument_terminal,
            ltl_command: ltl_command.as_deref(),
            ctl_command: ctl_command.as_deref(),
            via_shell: *via_shell,
            verbose: *verbose,
            counterexamples: *counterexamples,
            out,
            run_subfolder: cli.run_subfolder,
        }),
    }
}
