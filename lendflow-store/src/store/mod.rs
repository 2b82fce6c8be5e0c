mod traits;
mod types;

pub use traits::{ConfigStore, DeploymentStore, LogSink, RunHistory, StoreError};
pub use types::{DeploymentKind, ExecutionOutcome, IntegrationLog, NewIntegrationLog, RunSummary};
