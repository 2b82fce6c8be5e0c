use crate::error::{ConfigError, ParseError};
use crate::types::SequenceDocument;
use crate::validate::validate_sequence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedSequence {
    pub document: SequenceDocument,
    pub format: DocumentFormat,
}

pub fn parse_sequence_str(input: &str, format: DocumentFormat) -> Result<ParsedSequence, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedSequence {
            document: serde_json::from_str(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedSequence {
            document: serde_yaml::from_str(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_sequence_auto(input),
    }
}

fn parse_sequence_auto(input: &str) -> Result<ParsedSequence, ParseError> {
    // JSON documents start with `{` after trimming; YAML is a superset, so it is the fallback.
    if input.trim_start().starts_with('{') {
        return match serde_json::from_str::<SequenceDocument>(input) {
            Ok(document) => Ok(ParsedSequence {
                document,
                format: DocumentFormat::Json,
            }),
            Err(json_err) => match serde_yaml::from_str::<SequenceDocument>(input) {
                Ok(document) => Ok(ParsedSequence {
                    document,
                    format: DocumentFormat::Yaml,
                }),
                Err(_) => Err(ParseError::Json(json_err)),
            },
        };
    }

    match serde_yaml::from_str::<SequenceDocument>(input) {
        Ok(document) => Ok(ParsedSequence {
            document,
            format: DocumentFormat::Yaml,
        }),
        Err(yaml_err) => match serde_json::from_str::<SequenceDocument>(input) {
            Ok(document) => Ok(ParsedSequence {
                document,
                format: DocumentFormat::Json,
            }),
            Err(_) if input.trim().is_empty() => Err(ParseError::UnknownFormat),
            Err(_) => Err(ParseError::Yaml(yaml_err)),
        },
    }
}

/// Parse and validate in one step.
pub fn load_sequence_str(input: &str, format: DocumentFormat) -> Result<ParsedSequence, ConfigError> {
    let parsed = parse_sequence_str(input, format)?;
    validate_sequence(&parsed.document)?;
    Ok(parsed)
}
