use lendflow_exec::{RunReport, RunStatus, StepReport, StepResult};

use crate::output::{print_result, OutputFormat};
use crate::OutputArgs;

pub fn print_run_report(report: &RunReport, output: &OutputArgs) {
    if output.format != OutputFormat::Text || output.quiet {
        print_result(output.format, output.quiet, report);
        return;
    }
    if report.status == RunStatus::NoSequence {
        println!("no active sequence for lender {}", report.lender_id);
        return;
    }

    let mode = report.execution_mode.map(|m| m.as_str()).unwrap_or("-");
    println!(
        "Run: {} (lender {}, sequence {}, {mode})",
        report.run_id,
        report.lender_id,
        report.sequence_id.unwrap_or_default()
    );
    for step in &report.steps {
        match step {
            StepReport::Executed(r) => println!("{}", step_line(r)),
            StepReport::Skipped {
                name, step_order, ..
            } => println!("  [{step_order}] {name}: skipped"),
            StepReport::Errored {
                name,
                step_order,
                error,
                ..
            } => println!("  [{step_order}] {name}: task failed - {error}"),
        }
    }
    if report.halted {
        println!("stopped after first failure");
    }
    if !report.outputs.is_empty() {
        println!(
            "Outputs: {}",
            serde_json::to_string(&report.outputs).unwrap_or_default()
        );
    }
}

pub fn print_step_result(result: &StepResult, output: &OutputArgs) {
    if output.format == OutputFormat::Text && !output.quiet {
        println!("{}", step_line(result));
        if let Some(body) = &result.body {
            println!("{}", serde_json::to_string_pretty(body).unwrap_or_default());
        }
    } else {
        print_result(output.format, output.quiet, result);
    }
}

fn step_line(r: &StepResult) -> String {
    let status = r
        .status_code
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    let err = r
        .failure_message()
        .map(|e| format!(" - {e}"))
        .unwrap_or_default();
    let plural = if r.attempts == 1 { "" } else { "s" };
    format!(
        "  [{}] {}: {} {} -> {status} ({} ms, {} attempt{plural}){err}",
        r.step_order, r.name, r.request.method, r.url, r.duration_ms, r.attempts
    )
}
