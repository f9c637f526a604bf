use serde::Serialize;
use thiserror::Error;

use crate::combat::{simulate_fight, FightConfig, ValidationIssue};
use crate::report::{format_report, FightReport};
use crate::usage::UsageLog;

pub const SERVICE_NAME: &str = "dps-sim";
/// Body returned by the usage sink whatever happened to the record.
pub const LOG_ACK: &str = "{}";

#[derive(Debug, Clone, Serialize)]
pub struct SimulateResponse {
    pub status: &'static str,
    pub seed: u64,
    pub dps: f64,
    pub report: FightReport,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Debug, Error)]
pub enum SimulateError {
    #[error("{0}")]
    Parse(serde_json::Error),
    #[error("invalid fight config")]
    Validation(ValidationErrorResponse),
    #[error("failed to encode response: {0}")]
    Encode(serde_json::Error),
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn simulate_payload(body: &str) -> Result<String, SimulateError> {
    let config: FightConfig = serde_json::from_str(body).map_err(SimulateError::Parse)?;
    let errors = config.validation_issues();
    if !errors.is_empty() {
        return Err(SimulateError::Validation(ValidationErrorResponse {
            status: "error",
            message: "Validation failed",
            errors,
        }));
    }

    let report = simulate_fight(&config);
    let text = format_report(
        &report,
        config.main_hand.name.as_deref(),
        config.off_hand.as_ref().and_then(|w| w.name.as_deref()),
    );
    let response = SimulateResponse {
        status: "ok",
        seed: report.seed,
        dps: report.dps(),
        report,
        text,
    };
    serde_json::to_string_pretty(&response).map_err(SimulateError::Encode)
}

/// Record a run summary. Malformed bodies and write failures never reach the client.
pub fn log_payload(log: &UsageLog, body: &[u8]) -> &'static str {
    if let Err(err) = log.append_raw(body) {
        tracing::error!(%err, path = %log.path().display(), "failed to append usage record");
    }
    LOG_ACK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_names_service() {
        let payload = health_payload().expect("health");
        let value: serde_json::Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(value["service"], SERVICE_NAME);
    }

    #[test]
    fn simulate_rejects_zero_delay() {
        let err = simulate_payload(r#"{"main_hand":{"damage":10,"delay":0}}"#).unwrap_err();
        match err {
            SimulateError::Validation(response) => {
                assert_eq!(response.errors[0].field, "main_hand");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn log_acknowledges_even_when_unwritable() {
        let log = UsageLog::new("/nonexistent-dir/usage.jsonl");
        assert_eq!(log_payload(&log, br#"{"event":"sim_run"}"#), "{}");
    }
}
