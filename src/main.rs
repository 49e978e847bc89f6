//! HTTP boundary for the form-fill engine: accepts a record of field
//! values, fills the configured target form, and returns the fill report.

use std::any::Any;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use autoform::{
    FieldRegistry, FieldValue, FillReport, FormRecord, SessionConfig, SessionManager, fill_form,
};

const DEFAULT_FORM_URL: &str = "https://mendrika-alma.github.io/form-submission/";

struct AppState {
    manager: SessionManager,
    registry: FieldRegistry,
    form_url: String,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    service: &'static str,
    target_form: String,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health {
        status: "healthy",
        service: "autoform",
        target_form: state.form_url.clone(),
    })
}

async fn fill(
    State(state): State<Arc<AppState>>,
    Json(values): Json<HashMap<String, FieldValue>>,
) -> (StatusCode, Json<FillReport>) {
    let record = match FormRecord::new(&state.registry, values) {
        Ok(record) => record,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(FillReport::aborted(e.to_string(), Duration::ZERO)),
            );
        }
    };

    let report = fill_form(&state.manager, &state.registry, &record, &state.form_url).await;
    if let Some(ref e) = report.error {
        error!(error = %e, "form fill aborted");
    }
    (StatusCode::OK, Json(report))
}

/// Last-resort conversion of a panicking handler into a response: the
/// panic detail goes to the log, the client gets a generic aborted report.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    error!(error = %detail, "request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FillReport::aborted("Internal server error", Duration::ZERO)),
    )
        .into_response()
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let form_url = env::var("TARGET_FORM_URL").unwrap_or_else(|_| DEFAULT_FORM_URL.to_string());
    let headless = env::var("HEADLESS")
        .map(|v| v.to_lowercase() != "false")
        .unwrap_or(true);
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let config = SessionConfig::builder().headless(headless).build();
    let state = Arc::new(AppState {
        manager: SessionManager::new(config),
        registry: FieldRegistry::form_a28(),
        form_url,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/fill", post(fill))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("failed to bind listener");
    info!(port, target_form = %state.form_url, "autoform listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    state.manager.shutdown().await;
}
