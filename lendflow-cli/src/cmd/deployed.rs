use crate::exit_codes;
use crate::output::print_error;
use crate::{ExecArgs, InputArgs, OutputArgs, StoreArgs};

use super::config::{connect, correlation, load_input, Engine};
use super::report::{print_run_report, print_step_result};

pub async fn step_cmd(
    id: &str,
    input: InputArgs,
    exec: ExecArgs,
    output: OutputArgs,
    store: StoreArgs,
) -> i32 {
    let Some(payload) = load_input(&input, &output) else {
        return exit_codes::RUNTIME_ERROR;
    };
    let Some(pg) = connect(store, &output).await else {
        return exit_codes::RUNTIME_ERROR;
    };
    let engine = Engine::new(pg, &exec);

    match engine
        .dispatcher
        .execute_step(id, &payload, &correlation(&input))
        .await
    {
        Ok(result) => {
            print_step_result(&result, &output);
            if result.is_ok() {
                exit_codes::SUCCESS
            } else {
                exit_codes::RUN_FAILED
            }
        }
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            exit_codes::RUNTIME_ERROR
        }
    }
}

pub async fn integration_cmd(
    id: &str,
    input: InputArgs,
    exec: ExecArgs,
    output: OutputArgs,
    store: StoreArgs,
) -> i32 {
    let Some(payload) = load_input(&input, &output) else {
        return exit_codes::RUNTIME_ERROR;
    };
    let Some(pg) = connect(store, &output).await else {
        return exit_codes::RUNTIME_ERROR;
    };
    let engine = Engine::new(pg, &exec);

    match engine
        .dispatcher
        .execute_integration(id, &payload, &correlation(&input))
        .await
    {
        Ok(report) => {
            print_run_report(&report, &output);
            if report.failed_steps() == 0 {
                exit_codes::SUCCESS
            } else {
                exit_codes::RUN_FAILED
            }
        }
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            exit_codes::RUNTIME_ERROR
        }
    }
}
