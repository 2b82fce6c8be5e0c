#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lendflow_core::types::JsonMap;
use lendflow_core::{
    DeployedIntegration, DeployedStep, FieldMapping, IntegrationSequence, Lender, Step,
};
use lendflow_exec::executor::{HttpRequestParts, HttpResponseParts};
use lendflow_exec::{ExecutorConfig, HttpClient, HttpError, Orchestrator, StepExecutor};
use lendflow_store::{
    ConfigStore, DeploymentKind, DeploymentStore, ExecutionOutcome, LogSink, NewIntegrationLog,
    StoreError,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub enum Reply {
    Json(u16, Value),
    Text(u16, &'static str),
    Fail(HttpError),
}

/// Scripted HTTP client keyed by URL path. The last reply of a route repeats.
#[derive(Default)]
pub struct MockHttp {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<HttpRequestParts>>,
    delay: Option<Duration>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path: &str, replies: Vec<Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), replies.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HttpRequestParts> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == path)
            .cloned()
            .collect()
    }

    /// JSON body of the last request sent to `path`.
    pub fn last_body(&self, path: &str) -> Value {
        let reqs = self.requests_to(path);
        let last = reqs.last().expect("no request to path");
        serde_json::from_slice(&last.body).unwrap_or(Value::Null)
    }

    fn next_reply(&self, path: &str) -> Reply {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Json(200, json!({}))),
            None => Reply::Json(200, json!({})),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttp {
    async fn send(
        &self,
        req: HttpRequestParts,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        let path = req.url.path().to_string();
        self.calls.lock().unwrap().push(req);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let mut headers = std::collections::BTreeMap::new();
        headers.insert("set-cookie".to_string(), "session=abc".to_string());
        match self.next_reply(&path) {
            Reply::Json(status, body) => Ok(HttpResponseParts {
                status,
                headers,
                body: body.to_string().into_bytes(),
            }),
            Reply::Text(status, text) => Ok(HttpResponseParts {
                status,
                headers,
                body: text.as_bytes().to_vec(),
            }),
            Reply::Fail(e) => Err(e),
        }
    }
}

#[derive(Default)]
pub struct MockLogSink {
    pub logs: Mutex<Vec<NewIntegrationLog>>,
    pub fail: AtomicBool,
}

impl MockLogSink {
    pub fn logs(&self) -> Vec<NewIntegrationLog> {
        self.logs.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSink for MockLogSink {
    async fn append_integration_log(&self, log: NewIntegrationLog) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Database("log table unavailable".into()));
        }
        self.logs.lock().unwrap().push(log);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockConfig {
    pub lender: Option<Lender>,
    pub sequence: Option<IntegrationSequence>,
    pub steps: Vec<Step>,
    pub mappings: Vec<FieldMapping>,
}

#[async_trait]
impl ConfigStore for MockConfig {
    async fn get_lender(&self, lender_id: i64) -> Result<Option<Lender>, StoreError> {
        Ok(self.lender.clone().filter(|l| l.id == lender_id))
    }

    async fn get_active_sequence(
        &self,
        lender_id: i64,
    ) -> Result<Option<IntegrationSequence>, StoreError> {
        Ok(self
            .sequence
            .clone()
            .filter(|s| s.lender_id == lender_id && s.is_active))
    }

    async fn get_steps(&self, sequence_id: i64) -> Result<Vec<Step>, StoreError> {
        let mut steps: Vec<Step> = self
            .steps
            .iter()
            .filter(|s| s.sequence_id == Some(sequence_id))
            .cloned()
            .collect();
        steps.sort_by_key(|s| s.sequence_order);
        Ok(steps)
    }

    async fn get_field_mappings(&self, _lender_id: i64) -> Result<Vec<FieldMapping>, StoreError> {
        Ok(self.mappings.iter().filter(|m| m.is_active).cloned().collect())
    }
}

#[derive(Default)]
pub struct MockDeployments {
    pub steps: HashMap<String, DeployedStep>,
    pub integrations: HashMap<String, DeployedIntegration>,
    pub increments: Mutex<Vec<(DeploymentKind, String, ExecutionOutcome)>>,
    pub fail_increments: bool,
}

impl MockDeployments {
    pub fn increments(&self) -> Vec<(DeploymentKind, String, ExecutionOutcome)> {
        self.increments.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeploymentStore for MockDeployments {
    async fn get_deployed_step(&self, id: &str) -> Result<Option<DeployedStep>, StoreError> {
        Ok(self.steps.get(id).cloned())
    }

    async fn get_deployed_integration(
        &self,
        id: &str,
    ) -> Result<Option<DeployedIntegration>, StoreError> {
        Ok(self.integrations.get(id).cloned())
    }

    async fn increment_execution_metrics(
        &self,
        kind: DeploymentKind,
        id: &str,
        outcome: &ExecutionOutcome,
    ) -> Result<(), StoreError> {
        if self.fail_increments {
            return Err(StoreError::Database("deadlock detected".into()));
        }
        self.increments
            .lock()
            .unwrap()
            .push((kind, id.to_string(), outcome.clone()));
        Ok(())
    }
}

pub fn lender() -> Lender {
    serde_json::from_value(json!({
        "id": 1,
        "name": "Acme Lending",
        "base_url": "https://api.example.com",
    }))
    .unwrap()
}

/// A step with no retries and no retry delay.
pub fn step(id: i64, order: i32, endpoint: &str) -> Step {
    serde_json::from_value(json!({
        "id": id,
        "sequence_id": 10,
        "name": format!("step-{id}"),
        "sequence_order": order,
        "api_endpoint": endpoint,
        "retry_count": 0,
        "retry_delay_seconds": 0,
    }))
    .unwrap()
}

pub fn sequence(mode: &str, stop_on_error: bool) -> IntegrationSequence {
    serde_json::from_value(json!({
        "id": 10,
        "lender_id": 1,
        "name": "lead submission",
        "execution_mode": mode,
        "stop_on_error": stop_on_error,
    }))
    .unwrap()
}

pub fn mapping(source: &str, target: &str) -> FieldMapping {
    serde_json::from_value(json!({"source_field": source, "target_field": target})).unwrap()
}

pub fn obj(v: Value) -> JsonMap {
    match v {
        Value::Object(m) => m,
        _ => panic!("expected object"),
    }
}

pub struct Harness {
    pub http: Arc<MockHttp>,
    pub logs: Arc<MockLogSink>,
    pub config: Arc<MockConfig>,
    pub orchestrator: Orchestrator,
}

pub fn harness(http: MockHttp, config: MockConfig, exec_config: ExecutorConfig) -> Harness {
    let http = Arc::new(http);
    let logs = Arc::new(MockLogSink::default());
    let config = Arc::new(config);
    let steps = StepExecutor::new(exec_config, http.clone(), logs.clone());
    let orchestrator = Orchestrator::new(config.clone(), steps);
    Harness {
        http,
        logs,
        config,
        orchestrator,
    }
}
