//! Todo list and health check served as named remote procedures.
//!
//! `app` wires the procedure endpoint to an [`AppState`]; `main.rs` loads
//! [`config::ServerConfig`], opens a store and serves the router.

pub mod config;
pub mod rpc;
pub mod service;
pub mod store;

use std::future::Future;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ConfigError, CorsConfig, ServerConfig};
use crate::service::{HealthService, TodoService};
use crate::store::{MemoryStore, TodoStore};

/// Services shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub todos: TodoService,
    pub health: HealthService,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            todos: TodoService::new(store),
            health: HealthService,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

pub fn app(state: AppState) -> Router {
    rpc::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// [`app`] plus the layers `config` asks for.
pub fn app_with_config(state: AppState, config: &ServerConfig) -> Result<Router, ConfigError> {
    let router = app(state);
    Ok(match cors_layer(&config.cors)? {
        Some(cors) => router.layer(cors),
        None => router,
    })
}

fn cors_layer(config: &CorsConfig) -> Result<Option<CorsLayer>, ConfigError> {
    if config.allowed_origins.is_empty() {
        return Ok(None);
    }

    let allow_origin = if config.allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|e| ConfigError::InvalidValue {
                    field: "cors.allowed_origins".to_string(),
                    reason: format!("{origin}: {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    ))
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

/// Serve `router` until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
