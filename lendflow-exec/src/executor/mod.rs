mod auth;
pub mod dispatcher;
pub mod http;
pub mod orchestrator;
pub mod redact;
pub mod request;
pub mod response;
mod result;
mod types;
pub mod worker;

pub use dispatcher::{DispatchError, Dispatcher};
pub use http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts, ReqwestHttpClient};
pub use orchestrator::Orchestrator;
pub use request::{build_request, join_url, BuiltRequest, RequestBuildError, RequestSources};
pub use result::{ExecutionError, RequestSnapshot, RunReport, RunStatus, StepReport, StepResult};
pub use types::{Correlation, ExecutorConfig};
pub use worker::{StepContext, StepExecutor};
