use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a lender's active integration sequence.
    Run {
        lender_id: i64,
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        exec: ExecArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Execute a deployed step by id.
    Step {
        id: String,
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        exec: ExecArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Execute a deployed integration by id.
    Integration {
        id: String,
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        exec: ExecArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Validate a sequence document and make it the lender's active sequence.
    Save {
        lender_id: i64,
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Validate a sequence document without touching the database.
    Validate {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List recent runs of a lender.
    Runs {
        lender_id: i64,
        #[arg(long, default_value_t = 20)]
        limit: i64,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Show the integration log rows of one run.
    Trace {
        lender_id: i64,
        run_id: String,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    Migrate {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}
