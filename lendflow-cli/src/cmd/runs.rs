use lendflow_store::RunHistory;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, StoreArgs};

use super::config::connect;

pub async fn runs_cmd(lender_id: i64, limit: i64, output: OutputArgs, store: StoreArgs) -> i32 {
    let Some(pg) = connect(store, &output).await else {
        return exit_codes::RUNTIME_ERROR;
    };

    let runs = match pg.list_runs(lender_id, limit).await {
        Ok(r) => r,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to list runs: {e}"),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    if output.format == OutputFormat::Text && !output.quiet {
        if runs.is_empty() {
            println!("no runs for lender {lender_id}");
        }
        for r in &runs {
            println!(
                "{}  {}  {} steps, {} failed",
                r.request_id,
                r.finished_at.to_rfc3339(),
                r.log_count,
                r.failed_count
            );
        }
    } else {
        print_result(output.format, output.quiet, &runs);
    }
    exit_codes::SUCCESS
}
