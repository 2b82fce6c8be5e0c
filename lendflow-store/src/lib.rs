#![forbid(unsafe_code)]

pub mod store;
pub mod postgres;

pub use crate::store::{
    ConfigStore, DeploymentKind, DeploymentStore, ExecutionOutcome, IntegrationLog, LogSink,
    NewIntegrationLog, RunHistory, RunSummary, StoreError,
};
pub use crate::postgres::PostgresStore;
pub use crate::postgres::run_migrations;
