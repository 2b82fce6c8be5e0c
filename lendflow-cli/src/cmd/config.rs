use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use lendflow_core::path;
use lendflow_core::types::JsonMap;
use lendflow_exec::{
    Correlation, Dispatcher, ExecutorConfig, HttpClient, Orchestrator, ReqwestHttpClient,
    StepExecutor,
};
use lendflow_store::PostgresStore;
use serde_json::Value;

use crate::output::print_error;
use crate::utils::redact_url_password;
use crate::{ExecArgs, InputArgs, OutputArgs, StoreArgs};

pub fn get_database_url(store_arg: Option<String>, output: &OutputArgs) -> Option<String> {
    let url = store_arg
        .or_else(|| std::env::var("LENDFLOW_DATABASE_URL").ok())
        .or_else(|| std::env::var("DATABASE_URL").ok());
    if url.is_none() {
        print_error(
            output.format,
            output.quiet,
            "missing database URL. Set --store <url>, LENDFLOW_DATABASE_URL, or DATABASE_URL environment variable",
        );
    }
    url
}

pub async fn connect(store: StoreArgs, output: &OutputArgs) -> Option<PostgresStore> {
    let database_url = get_database_url(store.store, output)?;
    match PostgresStore::connect(&database_url, store.max_connections).await {
        Ok(pg) => Some(pg),
        Err(e) => {
            let safe_url = redact_url_password(&database_url);
            print_error(
                output.format,
                output.quiet,
                &format!("database connection failed to {safe_url}: {e}. Check your DATABASE_URL and ensure Postgres is running."),
            );
            None
        }
    }
}

/// The `--input` object with every `--set` applied on top.
pub fn load_input(args: &InputArgs, output: &OutputArgs) -> Option<JsonMap> {
    let mut payload = match &args.input {
        Some(path) => read_object(path, output)?,
        None => JsonMap::new(),
    };
    for s in &args.set_inputs {
        let Some((key, raw)) = s.split_once('=').filter(|(k, _)| !k.is_empty()) else {
            print_error(
                output.format,
                output.quiet,
                &format!("invalid --set '{s}': expected PATH=VALUE"),
            );
            return None;
        };
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        path::set(&mut payload, key, value);
    }
    Some(payload)
}

fn read_object(path: &Path, output: &OutputArgs) -> Option<JsonMap> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to read input {}: {e}", path.display()),
            );
            return None;
        }
    };
    let parsed = serde_json::from_str::<Value>(&content)
        .ok()
        .or_else(|| serde_yaml::from_str::<Value>(&content).ok());
    match parsed {
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            print_error(output.format, output.quiet, "input must be a JSON/YAML object");
            None
        }
        None => {
            print_error(
                output.format,
                output.quiet,
                "input file is neither valid JSON nor YAML",
            );
            None
        }
    }
}

pub fn correlation(args: &InputArgs) -> Correlation {
    Correlation {
        lead_id: args.lead_id.clone(),
        user_id: args.user_id.clone(),
    }
}

pub fn build_executor_config(exec: &ExecArgs) -> ExecutorConfig {
    ExecutorConfig {
        default_timeout: Duration::from_secs(exec.default_timeout),
        max_response_bytes: exec.max_response_bytes,
        log_every_attempt: exec.log_every_attempt,
        run_timeout: exec.run_timeout.map(Duration::from_secs),
    }
}

/// Runtime wiring over one pool: config reads, log writes and deployment
/// counters all go through the same `PostgresStore`.
pub struct Engine {
    pub orchestrator: Orchestrator,
    pub dispatcher: Dispatcher,
}

impl Engine {
    pub fn new(pg: PostgresStore, exec: &ExecArgs) -> Self {
        let store = Arc::new(pg);
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::default());
        let steps = StepExecutor::new(build_executor_config(exec), http, store.clone());
        let orchestrator = Orchestrator::new(store.clone(), steps);
        let dispatcher = Dispatcher::new(store.clone(), store, orchestrator.clone());
        Self {
            orchestrator,
            dispatcher,
        }
    }
}
