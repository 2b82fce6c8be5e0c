mod common;

use std::time::Duration;

use common::{harness, lender, mapping, obj, sequence, step, MockConfig, MockHttp, Reply};
use lendflow_exec::{Correlation, ExecutionError, ExecutorConfig, RunStatus, StepReport};
use serde_json::json;

fn config(mode: &str, stop_on_error: bool, steps: Vec<lendflow_core::Step>) -> MockConfig {
    MockConfig {
        lender: Some(lender()),
        sequence: Some(sequence(mode, stop_on_error)),
        steps,
        mappings: Vec::new(),
    }
}

#[tokio::test]
async fn outputs_flow_into_later_steps() {
    let mut validate = step(1, 1, "/validate");
    validate.output_fields = vec!["validation_id".into()];
    let mut submit = step(2, 2, "/submit");
    submit.depends_on_fields = [("ref".to_string(), "validation_id".to_string())].into();

    let mut cfg = config("sequential", true, vec![submit, validate]);
    cfg.mappings = vec![
        mapping("first_name", "applicant.first_name"),
        mapping("email", "applicant.email"),
    ];
    let h = harness(
        MockHttp::new()
            .route("/validate", vec![Reply::Json(200, json!({"validation_id": "V1"}))])
            .route("/submit", vec![Reply::Json(201, json!({"accepted": true}))]),
        cfg,
        ExecutorConfig::default(),
    );

    let input = obj(json!({"first_name": "Ada", "email": "ada@example.com"}));
    let report = h
        .orchestrator
        .run_lender(1, &input, &Correlation::default())
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.status, RunStatus::Ok);
    assert_eq!(report.steps.len(), 2);
    assert_eq!(report.steps[0].step_id(), 1);
    assert_eq!(report.outputs, obj(json!({"validation_id": "V1"})));
    assert_eq!(
        h.http.last_body("/submit"),
        json!({
            "ref": "V1",
            "applicant": {"first_name": "Ada", "email": "ada@example.com"}
        })
    );

    let logs = h.logs.logs();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.request_id == report.run_id));
}

#[tokio::test]
async fn stop_on_error_halts_the_run() {
    let h = harness(
        MockHttp::new().route("/one", vec![Reply::Json(500, json!({}))]),
        config("sequential", true, vec![step(1, 1, "/one"), step(2, 2, "/two")]),
        ExecutorConfig::default(),
    );

    let report = h
        .orchestrator
        .run_lender(1, &Default::default(), &Correlation::default())
        .await
        .unwrap();

    assert!(report.halted);
    assert!(!report.is_success());
    assert_eq!(report.steps.len(), 1);
    assert_eq!(h.http.calls_to("/two"), 0);
    assert_eq!(report.first_error().as_deref(), Some("step step-1: HTTP 500"));
}

#[tokio::test]
async fn failed_step_outputs_are_not_propagated() {
    let mut one = step(1, 1, "/one");
    one.output_fields = vec!["token".into()];
    let mut two = step(2, 2, "/two");
    two.depends_on_fields = [("token".to_string(), "token".to_string())].into();
    let h = harness(
        MockHttp::new().route("/one", vec![Reply::Json(422, json!({"token": "stale"}))]),
        config("sequential", false, vec![one, two]),
        ExecutorConfig::default(),
    );

    let report = h
        .orchestrator
        .run_lender(1, &Default::default(), &Correlation::default())
        .await
        .unwrap();

    assert!(!report.halted);
    assert_eq!(report.steps.len(), 2);
    assert_eq!(report.failed_steps(), 1);
    assert!(report.outputs.is_empty());
    assert_eq!(h.http.last_body("/two"), json!({}));
}

#[tokio::test]
async fn conditional_steps_are_skipped_when_predicates_fail() {
    let mut cfg = config(
        "conditional",
        true,
        vec![step(1, 1, "/always"), step(2, 2, "/large"), step(3, 3, "/small")],
    );
    if let Some(seq) = cfg.sequence.as_mut() {
        seq.condition_config = serde_json::from_value(json!({
            "2": {"loan": {"type": "exists"}, "loan.amount": {"type": "greater_than", "value": 10000}},
            "3": {"loan.amount": {"type": "less_than", "value": 10000}}
        }))
        .unwrap();
    }
    let h = harness(MockHttp::new(), cfg, ExecutorConfig::default());

    let report = h
        .orchestrator
        .run_lender(1, &obj(json!({"loan": {"amount": 2500}})), &Correlation::default())
        .await
        .unwrap();

    assert!(report.is_success());
    assert!(matches!(report.steps[1], StepReport::Skipped { step_id: 2, .. }));
    assert!(report.steps[2].as_executed().is_some());
    assert_eq!(h.http.calls_to("/always"), 1);
    assert_eq!(h.http.calls_to("/large"), 0);
    assert_eq!(h.http.calls_to("/small"), 1);
}

#[tokio::test]
async fn conditions_see_outputs_of_earlier_steps() {
    let mut check = step(1, 1, "/check");
    check.output_fields = vec!["decision".into()];
    let mut cfg = config("conditional", true, vec![check, step(2, 2, "/book")]);
    if let Some(seq) = cfg.sequence.as_mut() {
        seq.condition_config = serde_json::from_value(json!({
            "2": {"decision": {"type": "equals", "value": "approved"}}
        }))
        .unwrap();
    }
    let h = harness(
        MockHttp::new().route("/check", vec![Reply::Json(200, json!({"decision": "approved"}))]),
        cfg,
        ExecutorConfig::default(),
    );

    h.orchestrator
        .run_lender(1, &Default::default(), &Correlation::default())
        .await
        .unwrap();

    assert_eq!(h.http.calls_to("/book"), 1);
}

#[tokio::test]
async fn conditions_match_outputs_keyed_by_dotted_path() {
    let mut check = step(1, 1, "/check");
    check.output_fields = vec!["data.decision".into(), "$.score".into()];
    let mut cfg = config("conditional", true, vec![check, step(2, 2, "/book")]);
    if let Some(seq) = cfg.sequence.as_mut() {
        seq.condition_config = serde_json::from_value(json!({
            "2": {
                "data.decision": {"type": "equals", "value": "approved"},
                "$.score": {"type": "greater_than", "value": 600}
            }
        }))
        .unwrap();
    }
    let h = harness(
        MockHttp::new().route(
            "/check",
            vec![Reply::Json(200, json!({"data": {"decision": "approved"}, "score": 710}))],
        ),
        cfg,
        ExecutorConfig::default(),
    );

    let report = h
        .orchestrator
        .run_lender(1, &Default::default(), &Correlation::default())
        .await
        .unwrap();

    assert_eq!(report.outputs.get("data.decision"), Some(&json!("approved")));
    assert_eq!(h.http.calls_to("/book"), 1);
}

#[tokio::test]
async fn missing_active_sequence_contacts_nothing() {
    let mut cfg = config("sequential", true, vec![step(1, 1, "/one")]);
    if let Some(seq) = cfg.sequence.as_mut() {
        seq.is_active = false;
    }
    let h = harness(MockHttp::new(), cfg, ExecutorConfig::default());

    let report = h
        .orchestrator
        .run_lender(1, &Default::default(), &Correlation::default())
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::NoSequence);
    assert!(!report.is_success());
    assert!(report.steps.is_empty());
    assert_eq!(h.http.total_calls(), 0);
}

#[tokio::test]
async fn unknown_lender_is_a_config_error() {
    let h = harness(MockHttp::new(), MockConfig::default(), ExecutorConfig::default());

    let err = h
        .orchestrator
        .run_lender(99, &Default::default(), &Correlation::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::ConfigNotFound(_)));
}

#[tokio::test]
async fn parallel_runs_every_step_and_reports_in_order() {
    let mut a = step(1, 1, "/a");
    a.output_fields = vec!["a".into()];
    let mut b = step(2, 2, "/b");
    b.output_fields = vec!["b".into()];
    let h = harness(
        MockHttp::new()
            .route("/a", vec![Reply::Json(200, json!({"a": 1}))])
            .route("/b", vec![Reply::Json(500, json!({"b": 2}))])
            .route("/c", vec![Reply::Json(200, json!({}))]),
        config("parallel", true, vec![step(3, 3, "/c"), b, a]),
        ExecutorConfig::default(),
    );

    let report = h
        .orchestrator
        .run_lender(1, &obj(json!({"x": 1})), &Correlation::default())
        .await
        .unwrap();

    let ids: Vec<i64> = report.steps.iter().map(StepReport::step_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(!report.halted);
    assert_eq!(report.failed_steps(), 1);
    assert_eq!(report.outputs, obj(json!({"a": 1})));
    assert_eq!(h.http.total_calls(), 3);
    assert_eq!(h.logs.logs().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn run_timeout_bounds_the_whole_run() {
    let h = harness(
        MockHttp::new().with_delay(Duration::from_secs(10)),
        config("sequential", true, vec![step(1, 1, "/slow")]),
        ExecutorConfig {
            run_timeout: Some(Duration::from_secs(1)),
            ..ExecutorConfig::default()
        },
    );

    let err = h
        .orchestrator
        .run_lender(1, &Default::default(), &Correlation::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::RunTimedOut(d) if d == Duration::from_secs(1)));
}

#[tokio::test(start_paused = true)]
async fn parallel_steps_stop_when_the_run_times_out() {
    let h = harness(
        MockHttp::new().with_delay(Duration::from_secs(10)),
        config("parallel", false, vec![step(1, 1, "/a"), step(2, 2, "/b")]),
        ExecutorConfig {
            run_timeout: Some(Duration::from_secs(1)),
            ..ExecutorConfig::default()
        },
    );

    let err = h
        .orchestrator
        .run_lender(1, &Default::default(), &Correlation::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::RunTimedOut(_)));

    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(h.logs.logs().is_empty());
    assert!(h.http.total_calls() <= 2);
}
