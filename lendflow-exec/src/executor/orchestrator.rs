use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use lendflow_core::condition::should_execute;
use lendflow_core::types::JsonMap;
use lendflow_core::{ExecutionMode, FieldMapping, Lender, SequenceDocument};
use lendflow_store::ConfigStore;
use tokio::task::AbortHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::executor::request::RequestSources;
use crate::executor::result::{ExecutionError, RunReport, RunStatus, StepReport};
use crate::executor::types::Correlation;
use crate::executor::worker::{StepContext, StepExecutor};

/// Owns the control flow of a whole run: topology, output propagation and
/// stop-on-error.
#[derive(Clone)]
pub struct Orchestrator {
    config_store: Arc<dyn ConfigStore>,
    steps: StepExecutor,
}

/// Everything one run reads; nothing in here changes while the run is in flight.
struct RunPlan {
    run_id: Uuid,
    lender: Arc<Lender>,
    doc: Arc<SequenceDocument>,
    field_mappings: Arc<Vec<FieldMapping>>,
    input: Arc<JsonMap>,
    correlation: Arc<Correlation>,
}

impl Orchestrator {
    pub fn new(config_store: Arc<dyn ConfigStore>, steps: StepExecutor) -> Self {
        Self {
            config_store,
            steps,
        }
    }

    pub fn step_executor(&self) -> &StepExecutor {
        &self.steps
    }

    /// Run the lender's active sequence against `input`.
    ///
    /// Without an active sequence this returns a `no_sequence` report and
    /// contacts no endpoint.
    pub async fn run_lender(
        &self,
        lender_id: i64,
        input: &JsonMap,
        correlation: &Correlation,
    ) -> Result<RunReport, ExecutionError> {
        let run_id = Uuid::new_v4();
        self.with_run_timeout(self.load_and_run(run_id, lender_id, input, correlation))
            .await
    }

    /// Run an already-resolved sequence, e.g. a deployed snapshot.
    pub async fn run_sequence(
        &self,
        lender: &Lender,
        doc: &SequenceDocument,
        field_mappings: &[FieldMapping],
        input: &JsonMap,
        correlation: &Correlation,
    ) -> Result<RunReport, ExecutionError> {
        let plan = RunPlan {
            run_id: Uuid::new_v4(),
            lender: Arc::new(lender.clone()),
            doc: Arc::new(doc.clone()),
            field_mappings: Arc::new(field_mappings.to_vec()),
            input: Arc::new(input.clone()),
            correlation: Arc::new(correlation.clone()),
        };
        self.with_run_timeout(async { Ok(self.execute(plan).await) })
            .await
    }

    async fn load_and_run(
        &self,
        run_id: Uuid,
        lender_id: i64,
        input: &JsonMap,
        correlation: &Correlation,
    ) -> Result<RunReport, ExecutionError> {
        let lender = self
            .config_store
            .get_lender(lender_id)
            .await?
            .ok_or_else(|| ExecutionError::ConfigNotFound(format!("lender {lender_id}")))?;

        let Some(sequence) = self.config_store.get_active_sequence(lender_id).await? else {
            tracing::info!(%run_id, lender_id, "no active sequence for lender");
            return Ok(RunReport::no_sequence(run_id, lender_id));
        };
        let steps = self.config_store.get_steps(sequence.id).await?;
        let field_mappings = self.config_store.get_field_mappings(lender_id).await?;

        let plan = RunPlan {
            run_id,
            lender: Arc::new(lender),
            doc: Arc::new(SequenceDocument { sequence, steps }),
            field_mappings: Arc::new(field_mappings),
            input: Arc::new(input.clone()),
            correlation: Arc::new(correlation.clone()),
        };
        Ok(self.execute(plan).await)
    }

    async fn with_run_timeout<F>(&self, fut: F) -> Result<RunReport, ExecutionError>
    where
        F: Future<Output = Result<RunReport, ExecutionError>>,
    {
        match self.steps.config().run_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
                tracing::error!(timeout_ms = limit.as_millis() as u64, "run timed out");
                Err(ExecutionError::RunTimedOut(limit))
            }),
            None => fut.await,
        }
    }

    async fn execute(&self, plan: RunPlan) -> RunReport {
        let seq = &plan.doc.sequence;
        let mode = seq.execution_mode;
        let span = tracing::info_span!(
            "run",
            run_id = %plan.run_id,
            lender_id = plan.lender.id,
            sequence_id = seq.id
        );
        async {
            tracing::info!(mode = mode.as_str(), steps = plan.doc.steps.len(), "run started");
            let mut report = RunReport {
                status: RunStatus::Ok,
                run_id: plan.run_id,
                sequence_id: Some(seq.id),
                lender_id: plan.lender.id,
                execution_mode: Some(mode),
                stop_on_error: seq.stop_on_error,
                retry_failed_steps: seq.retry_failed_steps,
                halted: false,
                steps: Vec::new(),
                outputs: JsonMap::new(),
            };
            match mode {
                ExecutionMode::Sequential | ExecutionMode::Conditional => {
                    self.run_in_order(&plan, &mut report).await
                }
                ExecutionMode::Parallel => self.run_parallel(&plan, &mut report).await,
            }
            tracing::info!(
                failed = report.failed_steps(),
                halted = report.halted,
                "run finished"
            );
            report
        }
        .instrument(span)
        .await
    }

    /// Sequential and conditional topologies: one step at a time, outputs of
    /// successful steps visible to every later step.
    async fn run_in_order(&self, plan: &RunPlan, report: &mut RunReport) {
        let seq = &plan.doc.sequence;
        let gated = seq.execution_mode == ExecutionMode::Conditional;
        let mut accumulated = (*plan.input).clone();
        let ctx = self.context(plan);

        for step in plan.doc.ordered_steps() {
            if gated && !should_execute(&step, &seq.condition_config, &accumulated) {
                tracing::info!(step_id = step.id, "step conditions not met; skipping");
                report.steps.push(StepReport::Skipped {
                    step_id: step.id,
                    name: step.display_name(),
                    step_order: step.sequence_order,
                });
                continue;
            }

            let sources = RequestSources {
                input: &plan.input,
                prior_outputs: &report.outputs,
                field_mappings: &plan.field_mappings,
                seed_body: None,
            };
            let result = self.steps.execute(&step, ctx, sources).await;
            let ok = result.is_ok();
            if ok {
                for (k, v) in &result.extracted_outputs {
                    report.outputs.insert(k.clone(), v.clone());
                    accumulated.insert(k.clone(), v.clone());
                }
            }
            report.steps.push(StepReport::Executed(result));

            if !ok && seq.stop_on_error {
                tracing::info!(step_id = step.id, "step failed; stopping run");
                report.halted = true;
                break;
            }
        }
    }

    /// One task per step over the shared client. Steps see only the initial
    /// input; a dead task is reported in place rather than aborting the batch.
    async fn run_parallel(&self, plan: &RunPlan, report: &mut RunReport) {
        let ordered = plan.doc.ordered_steps();
        let handles = ordered.iter().cloned().map(|step| {
            let executor = self.steps.clone();
            let lender = plan.lender.clone();
            let input = plan.input.clone();
            let field_mappings = plan.field_mappings.clone();
            let correlation = plan.correlation.clone();
            let run_id = plan.run_id;
            let sequence_id = plan.doc.sequence.id;
            tokio::spawn(
                async move {
                    let ctx = StepContext {
                        run_id,
                        lender: &lender,
                        sequence_id: Some(sequence_id),
                        correlation: &correlation,
                    };
                    let no_outputs = JsonMap::new();
                    let sources = RequestSources {
                        input: &input,
                        prior_outputs: &no_outputs,
                        field_mappings: &field_mappings,
                        seed_body: None,
                    };
                    executor.execute(&step, ctx, sources).await
                }
                .in_current_span(),
            )
        });

        let handles: Vec<_> = handles.collect();
        // A run timeout drops this future; the spawned steps must not outlive it.
        let _guard = AbortOnDrop(handles.iter().map(|h| h.abort_handle()).collect());
        let joined = join_all(handles).await;
        for (step, joined) in ordered.iter().zip(joined) {
            match joined {
                Ok(result) => {
                    if result.is_ok() {
                        for (k, v) in &result.extracted_outputs {
                            report.outputs.insert(k.clone(), v.clone());
                        }
                    }
                    report.steps.push(StepReport::Executed(result));
                }
                Err(e) => {
                    tracing::error!(step_id = step.id, error = %e, "parallel step task failed");
                    report.steps.push(StepReport::Errored {
                        step_id: step.id,
                        name: step.display_name(),
                        step_order: step.sequence_order,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    fn context<'a>(&self, plan: &'a RunPlan) -> StepContext<'a> {
        StepContext {
            run_id: plan.run_id,
            lender: &plan.lender,
            sequence_id: Some(plan.doc.sequence.id),
            correlation: &plan.correlation,
        }
    }
}

struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}
