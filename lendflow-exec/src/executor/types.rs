use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Used when a step declares `timeout_seconds: 0`.
    pub default_timeout: Duration,
    pub max_response_bytes: usize,
    /// Write a log row for every attempt instead of only the final one.
    pub log_every_attempt: bool,
    /// Upper bound on one whole run, dependency waits and retries included.
    pub run_timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
            log_every_attempt: false,
            run_timeout: None,
        }
    }
}

/// Business identifiers copied onto every log row of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Correlation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}
