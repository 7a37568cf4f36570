//! Application state and router builder.
//!
//! # Example
//!
//! ```no_run
//! use taskhive_api::{app::AppState, config::Config};
//! use sqlx::PgPool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = PgPool::connect(&config.database.url).await?;
//! let state = AppState::new(pool, config);
//! let app = taskhive_api::app::build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::{config::Config, mailer::Mailer, realtime::rooms::RoomRegistry};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhive_shared::auth::{jwt, middleware::AuthContext};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor. Every
/// field is itself a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Live project rooms for realtime fan-out
    pub rooms: RoomRegistry,

    /// Outbound mail dispatcher
    pub mailer: Mailer,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let mailer = Mailer::new(config.mail.clone());

        Self {
            db,
            config: Arc::new(config),
            rooms: RoomRegistry::new(),
            mailer,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /ws                              # Realtime rooms (public upgrade)
/// └── /api/
///     ├── /users/                      # Accounts
///     │   ├── POST /                   # Register
///     │   ├── POST /login
///     │   ├── GET  /confirm/:token
///     │   ├── POST /forgot-password
///     │   ├── GET  /reset-password/:token
///     │   ├── POST /reset-password/:token
///     │   └── GET  /profile            # (authenticated)
///     ├── /projects/                   # (authenticated)
///     │   ├── POST   /
///     │   ├── GET    /
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   ├── DELETE /:id
///     │   ├── POST   /:id/collaborators
///     │   ├── DELETE /:id/collaborators
///     │   └── POST   /collaborators/search
///     └── /tasks/                      # (authenticated)
///         ├── POST   /
///         ├── GET    /:id
///         ├── PUT    /:id
///         ├── DELETE /:id
///         └── POST   /:id/state
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-group JWT layer)
pub fn build_router(state: AppState) -> Router {
    use crate::{realtime, routes};

    // Account routes (public, no auth required)
    let user_routes = Router::new()
        .route("/", post(routes::users::register))
        .route("/login", post(routes::users::login))
        .route("/confirm/:token", get(routes::users::confirm_account))
        .route("/forgot-password", post(routes::users::forgot_password))
        .route(
            "/reset-password/:token",
            get(routes::users::check_reset_token).post(routes::users::reset_password),
        )
        .merge(
            // Profile needs a session
            Router::new()
                .route("/profile", get(routes::users::profile))
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_layer,
                )),
        );

    // Project routes (require JWT authentication)
    let project_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .route(
            "/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/:id/collaborators",
            post(routes::projects::add_collaborator).delete(routes::projects::remove_collaborator),
        )
        .route(
            "/collaborators/search",
            post(routes::projects::search_collaborator),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Task routes (require JWT authentication)
    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/state", post(routes::tasks::toggle_task_state))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes);

    // Configure CORS based on environment
    let cors = if state.config.cors_allow_any() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: explicit origin whitelist
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/ws", get(realtime::socket::ws_handler))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization
/// header, then injects `AuthContext` into request extensions. Any
/// failure here is a 401; routes the layer wraps never run without a
/// valid session.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::Unauthorized("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_claims(&claims);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, DatabaseConfig, JwtConfig, MailConfig};

    fn test_state() -> AppState {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/taskhive_test".to_string(),
                max_connections: 2,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            mail: MailConfig {
                endpoint: None,
                from: "TaskHive <accounts@taskhive.dev>".to_string(),
                frontend_url: "http://localhost:5173".to_string(),
            },
        };

        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .expect("Lazy pool creation should not touch the network");

        AppState::new(pool, config)
    }

    #[tokio::test]
    async fn test_router_builds_without_route_conflicts() {
        // Route registration panics on path conflicts, so building the
        // full router is itself the assertion.
        let _router = build_router(test_state());
    }
}
