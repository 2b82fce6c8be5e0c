#![forbid(unsafe_code)]

//! Runtime engine for lender integration sequences.
//!
//! Config value objects, path access and field transformations live in
//! `lendflow-core`; persistence sits behind the traits in `lendflow-store`.

pub mod executor;

pub use crate::executor::{
    Correlation, DispatchError, Dispatcher, ExecutionError, ExecutorConfig, HttpClient,
    HttpError, Orchestrator, ReqwestHttpClient, RunReport, RunStatus, StepExecutor, StepReport,
    StepResult,
};
