use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, put},
};
use entity::employees;
use platform_api::{ApiError, Envelope, Reply};
use platform_db::{self, DbPool};
use products_hr::{EmployeeService, parse_id};
use serde::Serialize;
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub service: EmployeeService,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "employee service listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            put(update_employee).delete(delete_employee),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

type HttpResult<T> = Result<T, ApiError>;

fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidBody(rejection.body_text())
}

async fn list_employees(
    State(state): State<AppState>,
) -> HttpResult<Reply<Vec<employees::Model>>> {
    let employees = state.service.list().await?;
    Ok(Reply(StatusCode::OK, Envelope::data(employees)))
}

async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> HttpResult<Reply<()>> {
    let Json(body) = payload.map_err(bad_json)?;
    state.service.create(&body).await?;
    Ok(Reply(
        StatusCode::CREATED,
        Envelope::message("Employee added successfully!"),
    ))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> HttpResult<Reply<()>> {
    let id = parse_id(&id)?;
    let body = payload.ok().map(|Json(body)| body);
    state.service.update(id, body.as_ref()).await?;
    Ok(Reply(
        StatusCode::OK,
        Envelope::message("Employee updated successfully!"),
    ))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HttpResult<Reply<()>> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(Reply(
        StatusCode::OK,
        Envelope::message("Employee deleted successfully!"),
    ))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = platform_db::ping(&state.pool).await.is_ok();
    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            ok: db_ok,
            db_ok,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };

    info!("shutdown signal received");
}
