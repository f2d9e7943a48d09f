//! Server initialization and routing

use crate::api;
use crate::config::{Config, CorsConfig};
use crate::jwt::JwtManager;
use crate::middleware::{
    inject_client_ip, normalize_error_response, rate_limit_middleware, require_auth_middleware,
    route_not_found, sanitize_input, security_headers_middleware, AuthMiddlewareState,
    ObservabilityLayer, RateLimitState, SanitizedMakeSpan,
};
use crate::migration;
use crate::openapi::ApiDoc;
use crate::repository::{JobRepositoryImpl, UserRepositoryImpl};
use crate::service::{AuthService, JobService};
use crate::state::HasServices;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub auth_service: Arc<AuthService<UserRepositoryImpl>>,
    pub job_service: Arc<JobService<JobRepositoryImpl>>,
    pub jwt_manager: JwtManager,
    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: Config,
        db_pool: MySqlPool,
        prometheus_handle: Option<PrometheusHandle>,
    ) -> Self {
        let jwt_manager = JwtManager::new(config.jwt.clone());

        let user_repo = Arc::new(UserRepositoryImpl::new(db_pool.clone()));
        let job_repo = Arc::new(JobRepositoryImpl::new(db_pool.clone()));

        Self {
            config: Arc::new(config),
            db_pool,
            auth_service: Arc::new(AuthService::new(user_repo, jwt_manager.clone())),
            job_service: Arc::new(JobService::new(job_repo)),
            jwt_manager,
            prometheus_handle,
        }
    }
}

impl HasServices for AppState {
    type UserRepo = UserRepositoryImpl;
    type JobRepo = JobRepositoryImpl;

    fn config(&self) -> &Config {
        &self.config
    }

    fn auth_service(&self) -> &AuthService<Self::UserRepo> {
        &self.auth_service
    }

    fn job_service(&self) -> &JobService<Self::JobRepo> {
        &self.job_service
    }

    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }

    fn prometheus_handle(&self) -> Option<&PrometheusHandle> {
        self.prometheus_handle.as_ref()
    }

    async fn check_ready(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.db_pool)
            .await
            .is_ok()
    }
}

/// Connect to the database, apply migrations and serve until shutdown
pub async fn run(config: Config, prometheus_handle: Option<PrometheusHandle>) -> Result<()> {
    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    info!("Connected to database");

    migration::apply(&db_pool).await?;

    let http_addr = config.http_addr();
    let state = AppState::new(config, db_pool.clone(), prometheus_handle);
    let app = build_router(state);

    let listener = TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("Failed to bind {}", http_addr))?;
    info!("HTTP server started on {}", http_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    db_pool.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allowed_origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

/// Build the HTTP router
///
/// Generic over [`HasServices`] so integration tests can drive the exact
/// production middleware stack against in-memory repositories.
pub fn build_router<S: HasServices>(state: S) -> Router {
    let config = state.config().clone();

    let auth_state = AuthMiddlewareState::new(state.jwt_manager().clone());
    let jobs = Router::new()
        .route(
            "/api/v1/jobs",
            get(api::job::list::<S>).post(api::job::create::<S>),
        )
        .route(
            "/api/v1/jobs/{id}",
            get(api::job::get::<S>)
                .patch(api::job::update::<S>)
                .delete(api::job::delete::<S>),
        )
        .route_layer(from_fn_with_state(auth_state, require_auth_middleware));

    let mut router = Router::new()
        .route("/", get(api::home::home))
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready::<S>))
        .route("/metrics", get(api::metrics::metrics_handler::<S>))
        .route("/api/v1/auth/register", post(api::auth::register::<S>))
        .route("/api/v1/auth/login", post(api::auth::login::<S>))
        .merge(jobs);

    if config.docs_enabled {
        router = router
            .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::build()));
    }

    let rate_limit = RateLimitState::new(&config.rate_limit);

    // Layers run bottom-up: the last one added sees the request first.
    router
        .fallback(route_not_found)
        .layer(from_fn_with_state(config.body_limit_bytes, sanitize_input))
        .layer(cors_layer(&config.cors))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(from_fn_with_state(rate_limit, rate_limit_middleware))
        .layer(from_fn_with_state(
            config.rate_limit.trust_proxy,
            inject_client_ip,
        ))
        // Outside the rate limiter so 429 responses carry the headers too
        .layer(from_fn_with_state(
            config.security_headers.clone(),
            security_headers_middleware,
        ))
        .layer(from_fn(normalize_error_response))
        .layer(ObservabilityLayer)
        .layer(TraceLayer::new_for_http().make_span_with(SanitizedMakeSpan))
        .with_state(state)
}
