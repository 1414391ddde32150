//! Application startup and lifecycle management.

use crate::config::{CorsConfig, SavingsConfig, StoreBackend};
use crate::handlers;
use crate::services::{InMemorySavingsStore, MongoSavingsStore, SavingsStore};
use axum::{
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SavingsStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn SavingsStore>) -> Self {
        Self { store }
    }
}

/// Build the HTTP router with both the v1 and v2 route sets.
pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        // v1
        .route(
            "/api/savings",
            get(handlers::list_savings).post(handlers::create_saving),
        )
        .route(
            "/api/savings/:id",
            put(handlers::update_saving).delete(handlers::delete_saving),
        )
        // v2
        .route("/api/savings/read", get(handlers::list_savings))
        .route(
            "/api/savings/read/date-interval",
            get(handlers::list_savings_by_date),
        )
        .route(
            "/api/savings/read/category/:category",
            get(handlers::list_savings_by_category),
        )
        .route("/api/savings/save", post(handlers::create_saving))
        .route("/api/savings/update/:id", put(handlers::update_saving))
        .route("/api/savings/delete/:id", delete(handlers::delete_saving))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(cors))
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    if cors.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    layer.allow_origin(
        cors.allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                    None
                }
            })
            .collect::<Vec<HeaderValue>>(),
    )
}

/// Open the store selected by configuration.
pub async fn connect_store(config: &SavingsConfig) -> Result<Arc<dyn SavingsStore>, AppError> {
    match config.store {
        StoreBackend::Mongo => {
            let db = MongoSavingsStore::connect(&config.mongodb.uri, &config.mongodb.database)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;
            db.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory savings store; data will not survive a restart");
            Ok(Arc::new(InMemorySavingsStore::new()))
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Build the application, opening the configured store.
    pub async fn build(config: SavingsConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await?;
        Self::build_with_store(config, store).await
    }

    /// Build the application around an already opened store.
    pub async fn build_with_store(
        config: SavingsConfig,
        store: Arc<dyn SavingsStore>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(store);
        let router = build_router(state.clone(), &config.cors);

        // Port 0 picks a random port, which the tests rely on.
        let addr = config.common.listen_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Savings service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn store(&self) -> Arc<dyn SavingsStore> {
        self.state.store.clone()
    }

    /// Serve until the process is killed.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn run_with_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}
