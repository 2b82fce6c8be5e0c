use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lendflow_core::{Lender, Step};
use lendflow_store::{LogSink, NewIntegrationLog};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::executor::http::{HttpClient, HttpError, HttpResponseParts};
use crate::executor::redact::sanitize_headers;
use crate::executor::request::{build_request, BuiltRequest, RequestSources};
use crate::executor::response::{body_for_log, extract_outputs, parse_body};
use crate::executor::result::{RequestSnapshot, StepResult};
use crate::executor::types::{Correlation, ExecutorConfig};

/// Run-scoped context for one step execution.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub run_id: Uuid,
    pub lender: &'a Lender,
    pub sequence_id: Option<i64>,
    pub correlation: &'a Correlation,
}

/// Executes single steps: builds the request, sends it with the step's retry
/// policy, extracts outputs and appends the integration log.
#[derive(Clone)]
pub struct StepExecutor {
    config: ExecutorConfig,
    http: Arc<dyn HttpClient>,
    log_sink: Arc<dyn LogSink>,
}

impl StepExecutor {
    pub fn new(config: ExecutorConfig, http: Arc<dyn HttpClient>, log_sink: Arc<dyn LogSink>) -> Self {
        Self {
            config,
            http,
            log_sink,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub async fn execute(
        &self,
        step: &Step,
        ctx: StepContext<'_>,
        sources: RequestSources<'_>,
    ) -> StepResult {
        let started = Instant::now();
        let built = match build_request(step, ctx.lender, sources) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(run_id = %ctx.run_id, step_id = step.id, error = %e, "step request could not be built");
                return self.build_failure(step, ctx, e.to_string(), started).await;
            }
        };

        let timeout = if step.timeout_seconds == 0 {
            self.config.default_timeout
        } else {
            Duration::from_secs(step.timeout_seconds)
        };
        let delay = Duration::from_secs(step.retry_delay_seconds);

        let mut attempt: u32 = 0;
        loop {
            tracing::debug!(
                run_id = %ctx.run_id,
                step_id = step.id,
                attempt,
                method = %built.method,
                url = %built.url,
                "sending step request"
            );
            let outcome = self
                .http
                .send(built.to_parts(), timeout, self.config.max_response_bytes)
                .await;

            let last = match &outcome {
                Ok(_) => true,
                Err(e) => !e.is_retryable() || attempt >= step.retry_count,
            };
            if last || self.config.log_every_attempt {
                self.append_log(step, ctx, &built, &outcome, attempt, started.elapsed())
                    .await;
            }

            match outcome {
                Ok(resp) => {
                    return finish_response(step, &built, resp, attempt + 1, started.elapsed())
                }
                Err(e) if last => {
                    tracing::warn!(
                        run_id = %ctx.run_id,
                        step_id = step.id,
                        attempts = attempt + 1,
                        error = %e,
                        "step failed; not retrying"
                    );
                    return finish_error(step, &built, &e, attempt + 1, started.elapsed());
                }
                Err(e) => {
                    tracing::debug!(
                        run_id = %ctx.run_id,
                        step_id = step.id,
                        attempt,
                        error = %e,
                        delay_s = delay.as_secs(),
                        "step attempt failed; retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn append_log(
        &self,
        step: &Step,
        ctx: StepContext<'_>,
        built: &BuiltRequest,
        outcome: &Result<HttpResponseParts, HttpError>,
        attempt: u32,
        elapsed: Duration,
    ) {
        let request_headers = sanitize_headers(&built.headers, &built.credential_headers);
        let (response_status, response_body, response_headers, error_message, error_code) =
            match outcome {
                Ok(resp) => {
                    let parsed = parse_body(resp);
                    (
                        Some(i32::from(resp.status)),
                        Some(body_for_log(resp, &parsed)),
                        headers_json(&sanitize_headers(&resp.headers, &[])),
                        None,
                        None,
                    )
                }
                Err(e) => (
                    None,
                    Some(json!({ "error": e.to_string() })),
                    json!({}),
                    Some(e.to_string()),
                    Some(e.code().to_string()),
                ),
            };

        let log = NewIntegrationLog {
            lender_id: ctx.lender.id,
            step_id: Some(step.id),
            sequence_id: ctx.sequence_id.or(step.sequence_id),
            step_order: step.sequence_order,
            request_id: ctx.run_id,
            request_url: built.url.to_string(),
            request_method: built.method.clone(),
            request_headers: headers_json(&request_headers),
            request_body: built.body.clone(),
            response_status,
            response_body,
            response_headers,
            duration_ms: elapsed.as_millis() as i64,
            error_message,
            error_code,
            retry_count: attempt as i32,
            lead_id: ctx.correlation.lead_id.clone(),
            user_id: ctx.correlation.user_id.clone(),
        };
        self.append(log, ctx.run_id, step.id).await;
    }

    async fn build_failure(
        &self,
        step: &Step,
        ctx: StepContext<'_>,
        message: String,
        started: Instant,
    ) -> StepResult {
        let log = NewIntegrationLog {
            lender_id: ctx.lender.id,
            step_id: Some(step.id),
            sequence_id: ctx.sequence_id.or(step.sequence_id),
            step_order: step.sequence_order,
            request_id: ctx.run_id,
            request_url: step.api_endpoint.clone(),
            request_method: step.method(),
            request_headers: json!({}),
            request_body: None,
            response_status: None,
            response_body: Some(json!({ "error": message })),
            response_headers: json!({}),
            duration_ms: started.elapsed().as_millis() as i64,
            error_message: Some(message.clone()),
            error_code: Some("request_build".to_string()),
            retry_count: 0,
            lead_id: ctx.correlation.lead_id.clone(),
            user_id: ctx.correlation.user_id.clone(),
        };
        self.append(log, ctx.run_id, step.id).await;

        StepResult {
            step_id: step.id,
            name: step.display_name(),
            step_order: step.sequence_order,
            url: step.api_endpoint.clone(),
            status_code: None,
            headers: BTreeMap::new(),
            body: None,
            success: false,
            extracted_outputs: Default::default(),
            error: Some(message),
            error_code: Some("request_build".to_string()),
            request: RequestSnapshot {
                method: step.method(),
                headers: BTreeMap::new(),
                body: None,
            },
            attempts: 0,
            duration_ms: started.elapsed().as_millis() as u64,
            warnings: Vec::new(),
        }
    }

    /// Log-sink failures never fail the step.
    async fn append(&self, log: NewIntegrationLog, run_id: Uuid, step_id: i64) {
        if let Err(e) = self.log_sink.append_integration_log(log).await {
            tracing::warn!(%run_id, step_id, error = %e, "failed to append integration log");
        }
    }
}

fn finish_response(
    step: &Step,
    built: &BuiltRequest,
    resp: HttpResponseParts,
    attempts: u32,
    elapsed: Duration,
) -> StepResult {
    let body = parse_body(&resp);
    let extracted_outputs = extract_outputs(&body, &step.output_fields);
    StepResult {
        step_id: step.id,
        name: step.display_name(),
        step_order: step.sequence_order,
        url: built.url.to_string(),
        status_code: Some(resp.status),
        headers: resp.headers,
        body: Some(body),
        success: true,
        extracted_outputs,
        error: None,
        error_code: None,
        request: snapshot(built),
        attempts,
        duration_ms: elapsed.as_millis() as u64,
        warnings: built.warnings.clone(),
    }
}

fn finish_error(
    step: &Step,
    built: &BuiltRequest,
    err: &HttpError,
    attempts: u32,
    elapsed: Duration,
) -> StepResult {
    StepResult {
        step_id: step.id,
        name: step.display_name(),
        step_order: step.sequence_order,
        url: built.url.to_string(),
        status_code: None,
        headers: BTreeMap::new(),
        body: None,
        success: false,
        extracted_outputs: Default::default(),
        error: Some(err.to_string()),
        error_code: Some(err.code().to_string()),
        request: snapshot(built),
        attempts,
        duration_ms: elapsed.as_millis() as u64,
        warnings: built.warnings.clone(),
    }
}

fn snapshot(built: &BuiltRequest) -> RequestSnapshot {
    RequestSnapshot {
        method: built.method.clone(),
        headers: built.headers.clone(),
        body: built.body.clone(),
    }
}

fn headers_json(headers: &BTreeMap<String, String>) -> JsonValue {
    serde_json::to_value(headers).unwrap_or_else(|_| json!({}))
}
