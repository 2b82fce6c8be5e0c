use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "lendflow", version, about = "Lender integration sequence runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lendflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            lender_id,
            input,
            exec,
            output,
            store,
        } => cmd::run::run_cmd(lender_id, input, exec, output, store).await,
        Command::Step {
            id,
            input,
            exec,
            output,
            store,
        } => cmd::deployed::step_cmd(&id, input, exec, output, store).await,
        Command::Integration {
            id,
            input,
            exec,
            output,
            store,
        } => cmd::deployed::integration_cmd(&id, input, exec, output, store).await,
        Command::Save {
            lender_id,
            path,
            output,
            store,
        } => cmd::save::save_cmd(lender_id, &path, output, store).await,
        Command::Validate { path, output } => cmd::validate::validate_cmd(&path, output).await,
        Command::Runs {
            lender_id,
            limit,
            output,
            store,
        } => cmd::runs::runs_cmd(lender_id, limit, output, store).await,
        Command::Trace {
            lender_id,
            run_id,
            output,
            store,
        } => cmd::trace::trace_cmd(lender_id, &run_id, output, store).await,
        Command::Migrate { store, output } => cmd::migrate::migrate_cmd(store, output).await,
    }
}
