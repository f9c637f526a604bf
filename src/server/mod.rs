use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::usage::{UsageLog, DEFAULT_USAGE_LOG_PATH};

pub mod api;
pub mod routes;

pub use routes::{route_request, HttpResponse};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8765";
pub const BIND_ENV: &str = "DPS_SIM_BIND";
pub const USAGE_LOG_ENV: &str = "DPS_SIM_USAGE_LOG";
const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

#[derive(Debug)]
pub struct ServerState {
    pub usage_log: UsageLog,
}

impl ServerState {
    pub fn new(usage_log_path: impl Into<PathBuf>) -> Self {
        Self {
            usage_log: UsageLog::new(usage_log_path),
        }
    }

    /// State configured from `DPS_SIM_USAGE_LOG`.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(USAGE_LOG_ENV).unwrap_or_else(|_| DEFAULT_USAGE_LOG_PATH.to_string()),
        )
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(CORS_MAX_AGE)
}

/// Every request goes through [`route_request`]; axum only provides transport and CORS.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(cors_layer())
        .with_state(state)
}

async fn dispatch(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> HttpResponse {
    let path = uri.path().to_string();
    let method_name = method.as_str().to_string();
    let handled = tokio::task::spawn_blocking(move || {
        route_request(&state, &method_name, &path, &body)
    })
    .await;
    match handled {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(%err, %method, %uri, "request handler failed");
            routes::internal_error()
        }
    }
}

pub async fn serve(bind_addr: &str, state: Arc<ServerState>) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        usage_log = %state.usage_log.path().display(),
        "dps-sim server listening"
    );
    axum::serve(listener, router(state)).await
}

/// Blocking entry point: builds a runtime and serves until the process exits.
pub fn run_server(bind_addr: &str, state: ServerState) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(bind_addr, Arc::new(state)))
}
