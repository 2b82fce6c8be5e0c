use lendflow_store::RunHistory;
use serde::Serialize;
use uuid::Uuid;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, StoreArgs};

use super::config::connect;

#[derive(Serialize)]
struct LogLine {
    step_id: Option<i64>,
    step_order: i32,
    method: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<i32>,
    duration_ms: i64,
    retries: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct TraceResult {
    run_id: String,
    lender_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    lead_id: Option<String>,
    logs: Vec<LogLine>,
}

pub async fn trace_cmd(lender_id: i64, run_id: &str, output: OutputArgs, store: StoreArgs) -> i32 {
    let run_uuid = match Uuid::parse_str(run_id) {
        Ok(u) => u,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("invalid run_id: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let Some(pg) = connect(store, &output).await else {
        return exit_codes::RUNTIME_ERROR;
    };

    let logs = match pg.get_run_logs(lender_id, run_uuid).await {
        Ok(l) if l.is_empty() => {
            print_error(output.format, output.quiet, "run not found");
            return exit_codes::RUNTIME_ERROR;
        }
        Ok(l) => l,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to get logs for run {run_uuid}: {e}"),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let result = TraceResult {
        run_id: run_uuid.to_string(),
        lender_id,
        lead_id: logs.iter().find_map(|l| l.lead_id.clone()),
        logs: logs
            .into_iter()
            .map(|l| LogLine {
                step_id: l.step_id,
                step_order: l.step_order,
                method: l.request_method,
                url: l.request_url,
                status: l.response_status,
                duration_ms: l.duration_ms,
                retries: l.retry_count,
                error: l.error_message,
            })
            .collect(),
    };

    if output.format == OutputFormat::Text && !output.quiet {
        println!("Run: {} (lender {})", result.run_id, result.lender_id);
        if let Some(lead) = &result.lead_id {
            println!("Lead: {lead}");
        }
        println!();
        for l in &result.logs {
            let status = l
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            let err = l
                .error
                .as_ref()
                .map(|e| format!(" - {e}"))
                .unwrap_or_default();
            println!(
                "Step {}: {} {} -> {status} ({}ms, {} retries){err}",
                l.step_order, l.method, l.url, l.duration_ms, l.retries
            );
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }

    exit_codes::SUCCESS
}
