mod common;
mod deployment;
mod lender;
mod mapping;
mod sequence;
mod step;

pub use common::{JsonMap, JsonValue};
pub use deployment::{DeployedIntegration, DeployedStep};
pub use lender::Lender;
pub use mapping::{FieldMapping, TransformationType};
pub use sequence::{Condition, ConditionConfig, ExecutionMode, IntegrationSequence, Predicate, SequenceDocument};
pub use step::{AuthType, RequestSchema, Step};
