use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct StoreArgs {
    /// Postgres URL; falls back to LENDFLOW_DATABASE_URL, then DATABASE_URL.
    #[arg(long)]
    pub store: Option<String>,
    #[arg(long, default_value_t = 10)]
    pub max_connections: u32,
}

/// Applicant payload for a run.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// JSON or YAML object file.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Dotted path and value; the value is read as JSON when it parses, else as a string.
    #[arg(long = "set", value_name = "PATH=VALUE")]
    pub set_inputs: Vec<String>,
    #[arg(long)]
    pub lead_id: Option<String>,
    #[arg(long)]
    pub user_id: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ExecArgs {
    /// Whole-run limit, retries and waits included.
    #[arg(long, value_name = "SECONDS")]
    pub run_timeout: Option<u64>,
    /// Used for steps declaring `timeout_seconds: 0`.
    #[arg(long, default_value_t = 30, value_name = "SECONDS")]
    pub default_timeout: u64,
    #[arg(long, default_value_t = 4_194_304)]
    pub max_response_bytes: usize,
    /// Write an integration log row for every attempt, not only the last.
    #[arg(long)]
    pub log_every_attempt: bool,
}
