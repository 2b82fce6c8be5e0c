use std::path::Path;

use lendflow_core::{load_sequence_str, ConfigError, DocumentFormat, ParsedSequence};
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::OutputArgs;

#[derive(Serialize)]
struct ValidateResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// Reads, parses and validates a sequence document. On failure the exit code
/// is returned in `Err` after the problem has been reported.
pub fn load_document(path: &Path, output: &OutputArgs) -> Result<ParsedSequence, i32> {
    let content = match std::fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to read {}: {e}", path.display()),
            );
            return Err(exit_codes::RUNTIME_ERROR);
        }
    };

    match load_sequence_str(&content, DocumentFormat::Auto) {
        Ok(parsed) => Ok(parsed),
        Err(ConfigError::Parse(e)) => {
            report_invalid(output, vec![e.to_string()]);
            Err(exit_codes::VALIDATION_FAILED)
        }
        Err(ConfigError::Validation(err)) => {
            let errors = err
                .violations
                .iter()
                .map(|v| format!("{}: {}", v.path, v.message))
                .collect();
            report_invalid(output, errors);
            Err(exit_codes::VALIDATION_FAILED)
        }
    }
}

fn report_invalid(output: &OutputArgs, errors: Vec<String>) {
    if output.format == OutputFormat::Text && !output.quiet {
        eprintln!("error: validation failed");
        for e in &errors {
            eprintln!("- {e}");
        }
    } else {
        let result = ValidateResult {
            valid: false,
            format: None,
            name: None,
            steps: None,
            errors,
        };
        print_result(output.format, output.quiet, &result);
    }
}

pub async fn validate_cmd(path: &Path, output: OutputArgs) -> i32 {
    let parsed = match load_document(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let seq = &parsed.document.sequence;

    if output.format == OutputFormat::Text && !output.quiet {
        println!(
            "ok: valid sequence '{}' ({} steps, {}, {:?})",
            seq.name,
            parsed.document.steps.len(),
            seq.execution_mode.as_str(),
            parsed.format
        );
    } else {
        let result = ValidateResult {
            valid: true,
            format: Some(format!("{:?}", parsed.format)),
            name: Some(seq.name.clone()),
            steps: Some(parsed.document.steps.len()),
            errors: vec![],
        };
        print_result(output.format, output.quiet, &result);
    }
    exit_codes::SUCCESS
}
