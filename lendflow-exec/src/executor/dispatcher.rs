use std::sync::Arc;

use lendflow_core::overlay_field_mappings;
use lendflow_core::types::JsonMap;
use lendflow_store::{ConfigStore, DeploymentKind, DeploymentStore, ExecutionOutcome, StoreError};
use uuid::Uuid;

use crate::executor::orchestrator::Orchestrator;
use crate::executor::request::RequestSources;
use crate::executor::result::{ExecutionError, RunReport, StepResult};
use crate::executor::types::Correlation;
use crate::executor::worker::StepContext;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("deployed {kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("deployed {kind} {id} is not active (status: {status})")]
    InactiveResource {
        kind: &'static str,
        id: String,
        status: String,
    },
    #[error("configuration not found: {0}")]
    ConfigNotFound(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("run timed out after {0:?}")]
    RunTimedOut(std::time::Duration),
}

impl From<ExecutionError> for DispatchError {
    fn from(e: ExecutionError) -> Self {
        match e {
            ExecutionError::ConfigNotFound(what) => DispatchError::ConfigNotFound(what),
            ExecutionError::Store(e) => DispatchError::Store(e),
            ExecutionError::RunTimedOut(limit) => DispatchError::RunTimedOut(limit),
        }
    }
}

/// Resolves deployed steps and integrations by id and runs them, keeping their
/// usage counters current.
pub struct Dispatcher {
    deployments: Arc<dyn DeploymentStore>,
    config_store: Arc<dyn ConfigStore>,
    orchestrator: Orchestrator,
}

impl Dispatcher {
    pub fn new(
        deployments: Arc<dyn DeploymentStore>,
        config_store: Arc<dyn ConfigStore>,
        orchestrator: Orchestrator,
    ) -> Self {
        Self {
            deployments,
            config_store,
            orchestrator,
        }
    }

    /// The payload, with the lender's mapped fields overlaid, is the step's base body.
    pub async fn execute_step(
        &self,
        id: &str,
        payload: &JsonMap,
        correlation: &Correlation,
    ) -> Result<StepResult, DispatchError> {
        let kind = DeploymentKind::Step;
        let deployed = self
            .deployments
            .get_deployed_step(id)
            .await?
            .ok_or_else(|| not_found(kind, id))?;
        if !deployed.is_active() {
            return Err(inactive(kind, id, &deployed.status));
        }

        let lender = self
            .config_store
            .get_lender(deployed.lender_id)
            .await?
            .ok_or_else(|| DispatchError::ConfigNotFound(format!("lender {}", deployed.lender_id)))?;
        let mappings = self.config_store.get_field_mappings(deployed.lender_id).await?;
        let seed = overlay_field_mappings(payload, &mappings);

        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, deployed_step = id, lender_id = lender.id, "executing deployed step");
        let ctx = StepContext {
            run_id,
            lender: &lender,
            sequence_id: deployed.step.sequence_id,
            correlation,
        };
        let sources = RequestSources {
            input: payload,
            prior_outputs: &JsonMap::new(),
            field_mappings: &[],
            seed_body: Some(&seed),
        };
        let executor = self.orchestrator.step_executor();
        let run = executor.execute(&deployed.step, ctx, sources);
        let result = match executor.config().run_timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(r) => r,
                Err(_) => {
                    let outcome = ExecutionOutcome::Failure {
                        error: format!("run timed out after {limit:?}"),
                    };
                    self.record(kind, id, &outcome).await;
                    return Err(DispatchError::RunTimedOut(limit));
                }
            },
            None => run.await,
        };

        let outcome = match result.failure_message() {
            None => ExecutionOutcome::Success,
            Some(error) => ExecutionOutcome::Failure { error },
        };
        self.record(kind, id, &outcome).await;
        Ok(result)
    }

    /// Runs the deployed sequence snapshot with its frozen field mappings.
    pub async fn execute_integration(
        &self,
        id: &str,
        payload: &JsonMap,
        correlation: &Correlation,
    ) -> Result<RunReport, DispatchError> {
        let kind = DeploymentKind::Integration;
        let deployed = self
            .deployments
            .get_deployed_integration(id)
            .await?
            .ok_or_else(|| not_found(kind, id))?;
        if !deployed.is_active() {
            return Err(inactive(kind, id, &deployed.status));
        }

        let lender = self
            .config_store
            .get_lender(deployed.lender_id)
            .await?
            .ok_or_else(|| DispatchError::ConfigNotFound(format!("lender {}", deployed.lender_id)))?;

        tracing::info!(deployed_integration = id, lender_id = lender.id, "executing deployed integration");
        let report = self
            .orchestrator
            .run_sequence(
                &lender,
                &deployed.sequence,
                &deployed.field_mappings,
                payload,
                correlation,
            )
            .await;

        match report {
            Ok(report) => {
                let outcome = match report.first_error() {
                    None => ExecutionOutcome::Success,
                    Some(error) => ExecutionOutcome::Failure { error },
                };
                self.record(kind, id, &outcome).await;
                Ok(report)
            }
            Err(e) => {
                let outcome = ExecutionOutcome::Failure {
                    error: e.to_string(),
                };
                self.record(kind, id, &outcome).await;
                Err(e.into())
            }
        }
    }

    /// Counter failures are logged and swallowed; the execution already happened.
    async fn record(&self, kind: DeploymentKind, id: &str, outcome: &ExecutionOutcome) {
        if let Err(e) = self
            .deployments
            .increment_execution_metrics(kind, id, outcome)
            .await
        {
            tracing::warn!(kind = kind.as_str(), id, error = %e, "failed to update execution counters");
        }
    }
}

fn not_found(kind: DeploymentKind, id: &str) -> DispatchError {
    DispatchError::NotFound {
        kind: kind.as_str(),
        id: id.to_string(),
    }
}

fn inactive(kind: DeploymentKind, id: &str, status: &str) -> DispatchError {
    DispatchError::InactiveResource {
        kind: kind.as_str(),
        id: id.to_string(),
        status: status.to_string(),
    }
}
