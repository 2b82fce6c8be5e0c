use std::path::Path;

use lendflow_store::StoreError;
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, StoreArgs};

use super::config::connect;
use super::validate::load_document;

#[derive(Serialize)]
struct SaveResult {
    lender_id: i64,
    sequence_id: i64,
    name: String,
    steps: usize,
}

pub async fn save_cmd(lender_id: i64, path: &Path, output: OutputArgs, store: StoreArgs) -> i32 {
    let parsed = match load_document(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let Some(pg) = connect(store, &output).await else {
        return exit_codes::RUNTIME_ERROR;
    };

    let doc = &parsed.document;
    match pg.save_sequence(lender_id, doc).await {
        Ok(sequence_id) => {
            let result = SaveResult {
                lender_id,
                sequence_id,
                name: doc.sequence.name.clone(),
                steps: doc.steps.len(),
            };
            if output.format == OutputFormat::Text && !output.quiet {
                println!(
                    "ok: saved sequence {} '{}' ({} steps) as active for lender {}",
                    result.sequence_id, result.name, result.steps, result.lender_id
                );
            } else {
                print_result(output.format, output.quiet, &result);
            }
            exit_codes::SUCCESS
        }
        Err(StoreError::Validation(e)) => {
            print_error(output.format, output.quiet, &e.to_string());
            exit_codes::VALIDATION_FAILED
        }
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to save sequence: {e}"),
            );
            exit_codes::RUNTIME_ERROR
        }
    }
}
