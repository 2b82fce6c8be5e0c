use lendflow_store::{DeploymentKind, ExecutionOutcome, StoreError};

#[test]
fn outcome_accessors() {
    assert!(ExecutionOutcome::Success.is_success());
    assert_eq!(ExecutionOutcome::Success.error(), None);

    let failed = ExecutionOutcome::Failure {
        error: "HTTP 502".into(),
    };
    assert!(!failed.is_success());
    assert_eq!(failed.error(), Some("HTTP 502"));
}

#[test]
fn deployment_kind_labels() {
    assert_eq!(DeploymentKind::Step.as_str(), "step");
    assert_eq!(DeploymentKind::Integration.as_str(), "integration");
}

#[test]
fn sqlx_errors_are_classified() {
    let not_found: StoreError = sqlx::Error::RowNotFound.into();
    assert!(matches!(not_found, StoreError::NotFound(_)));

    let pool_closed: StoreError = sqlx::Error::PoolClosed.into();
    assert!(matches!(pool_closed, StoreError::Database(_)));
}

#[test]
fn validation_errors_convert() {
    let err: StoreError = lendflow_core::ValidationError::new(vec![]).into();
    assert!(format!("{err}").contains("validation"));
}
