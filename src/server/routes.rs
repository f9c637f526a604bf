use crate::server::api;
use crate::server::ServerState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body: body.into(),
        }
    }
}

pub fn route_request(state: &ServerState, method: &str, path: &str, body: &[u8]) -> HttpResponse {
    match (method, path) {
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/simulate") => {
            let body = String::from_utf8_lossy(body);
            match api::simulate_payload(&body) {
                Ok(payload) => HttpResponse::json(payload),
                Err(api::SimulateError::Parse(err)) => {
                    error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
                }
                Err(api::SimulateError::Validation(validation)) => {
                    validation_error_response(400, "Bad Request", validation)
                }
                Err(err @ api::SimulateError::Encode(_)) => {
                    error_response(500, "Internal Server Error", &err.to_string())
                }
            }
        }
        ("POST", "/log") => HttpResponse::json(api::log_payload(&state.usage_log, body)),
        ("OPTIONS", _) => HttpResponse {
            status_code: 204,
            status_text: "No Content",
            content_type: "text/plain",
            body: String::new(),
        },
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

const FALLBACK_ERROR_BODY: &str = "{\"status\":\"error\",\"message\":\"Internal error\"}";

fn pretty_json<T: serde::Serialize>(payload: &T) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| FALLBACK_ERROR_BODY.to_string())
}

fn validation_error_response(
    status_code: u16,
    status_text: &'static str,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        ..HttpResponse::json(pretty_json(&payload))
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    let payload = serde_json::json!({ "status": "error", "message": message });
    HttpResponse {
        status_code,
        status_text,
        ..HttpResponse::json(pretty_json(&payload))
    }
}

pub(crate) fn internal_error() -> HttpResponse {
    error_response(500, "Internal Server Error", "Internal error")
}
