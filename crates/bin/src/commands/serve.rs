//! Serve command - runs the identd HTTP server.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use identd::{
    backend::KvStore,
    identity::{IdentityService, Session},
};
use serde::Serialize;
use tokio::signal::unix::{SignalKind, signal};
use tracing::Instrument;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::backend::{backend_name, create_backend, shutdown_backend, storage_path};
use crate::cli::ServeArgs;
use crate::rpc::{
    CurrentUserReq, LoginReq, LoginResp, RegisterReq, RpcError, SERVICE_PREFIX, UserReq, UserResp,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    service: IdentityService,
    backend: Arc<dyn KvStore>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(backend: Arc<dyn KvStore>, request_timeout: Duration) -> Self {
        Self {
            service: IdentityService::new(backend.clone()),
            backend,
            request_timeout,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

/// Run the identd server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("identd=info".parse()?))
        .init();

    let backend = create_backend(args).await?;
    let state = AppState::new(
        backend.clone(),
        Duration::from_secs(args.request_timeout),
    );
    let app = router(state);

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("identd listening on http://{local_addr}");
    println!("Storage: {}", storage_path(args).display());
    println!();
    println!("Available endpoints:");
    println!("  GET  /health");
    for method in ["Register", "Login", "User", "CurrentUser"] {
        println!("  POST {SERVICE_PREFIX}/{method}");
    }
    println!();
    println!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_backend(backend.as_ref()).await;
    println!("Server shut down");
    Ok(())
}

/// Build the HTTP router over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route(&format!("{SERVICE_PREFIX}/Register"), post(handle_register))
        .route(&format!("{SERVICE_PREFIX}/Login"), post(handle_login))
        .route(&format!("{SERVICE_PREFIX}/User"), post(handle_user))
        .route(
            &format!("{SERVICE_PREFIX}/CurrentUser"),
            post(handle_current_user),
        )
        .with_state(state)
}

/// Resolves on SIGTERM or SIGINT.
async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!("Failed to set up SIGTERM handler: {e}");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}

/// Run one service call under the request timeout and a per-request span.
///
/// When the timeout fires the call's future is dropped, abandoning it at its
/// current await point.
async fn call<T, F>(state: &AppState, method: &'static str, fut: F) -> Result<Json<T>, RpcError>
where
    F: Future<Output = identd::Result<T>>,
{
    let span = tracing::info_span!("rpc", method, request_id = %Uuid::new_v4());
    match tokio::time::timeout(state.request_timeout, fut)
        .instrument(span)
        .await
    {
        Ok(result) => result.map(Json).map_err(RpcError::from),
        Err(_) => {
            tracing::warn!(method, "Request exceeded {:?}", state.request_timeout);
            Err(RpcError::deadline_exceeded())
        }
    }
}

fn decode<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    body.map(|Json(req)| req)
        .map_err(|rejection| RpcError::malformed(rejection.body_text()))
}

/// Handler for GET /health
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        backend: backend_name(state.backend.as_ref()),
    })
}

async fn handle_register(
    State(state): State<AppState>,
    body: Result<Json<RegisterReq>, JsonRejection>,
) -> Result<Json<UserResp>, RpcError> {
    let req = decode(body)?;
    call(&state, "Register", async {
        let user = state.service.register(&req.username, &req.password).await?;
        Ok(UserResp { user })
    })
    .await
    .map_err(|e| e.for_message("RegisterReq"))
}

async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<LoginReq>, JsonRejection>,
) -> Result<Json<LoginResp>, RpcError> {
    let req = decode(body)?;
    call(&state, "Login", async {
        let session = state.service.login(&req.username, &req.password).await?;
        Ok(LoginResp { session })
    })
    .await
}

async fn handle_user(
    State(state): State<AppState>,
    body: Result<Json<UserReq>, JsonRejection>,
) -> Result<Json<UserResp>, RpcError> {
    let req = decode(body)?;
    call(&state, "User", async {
        let user = state.service.lookup_user(&req.username).await?;
        Ok(UserResp { user })
    })
    .await
}

async fn handle_current_user(
    State(state): State<AppState>,
    body: Result<Json<CurrentUserReq>, JsonRejection>,
) -> Result<Json<UserResp>, RpcError> {
    let session: Session = decode(body)?.session.into();
    call(&state, "CurrentUser", async {
        let user = state.service.lookup_by_session(&session).await?;
        Ok(UserResp { user })
    })
    .await
}
