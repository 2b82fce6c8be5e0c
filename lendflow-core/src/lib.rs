#![forbid(unsafe_code)]

pub mod condition;
pub mod error;
pub mod mapping;
pub mod parser;
pub mod path;
pub mod transform;
pub mod types;
pub mod validate;

pub use crate::error::{ConfigError, ParseError, ValidationError, Violation};
pub use crate::mapping::{apply_field_mappings, overlay_field_mappings, ValidationWarning};
pub use crate::parser::{load_sequence_str, parse_sequence_str, DocumentFormat, ParsedSequence};
pub use crate::transform::{transform, value_to_string};
pub use crate::types::{
    AuthType, DeployedIntegration, DeployedStep, ExecutionMode, FieldMapping,
    IntegrationSequence, Lender, SequenceDocument, Step, TransformationType,
};
pub use crate::validate::{validate_sequence, Validate};
