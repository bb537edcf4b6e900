use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cross-process state bridge: one owner store, many mirrored views.
#[derive(Parser, Debug)]
#[command(name = "statebridge", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Run the owner: store, surfaces, console on stdin.
    Owner {
        /// Accept view processes on this address (e.g. 127.0.0.1:7878).
        #[arg(long)]
        listen: Option<String>,
    },
    /// Run a view process against an owner.
    View {
        /// Owner address.
        #[arg(long)]
        connect: String,

        /// Intent to send after bootstrap, as `<TYPE> [payload]`. Repeatable.
        #[arg(long = "dispatch", value_name = "INTENT")]
        dispatch: Vec<String>,

        /// Print the state after the dispatches and exit.
        #[arg(long)]
        once: bool,
    },
}
