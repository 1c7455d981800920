/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use dax_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::security::SecurityHeadersLayer,
    routes::{self, Links},
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use dax_shared::auth::middleware::authenticate;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Link builder rooted at `API_PUBLIC_URL`
    pub fn links(&self) -> Links<'_> {
        Links::new(&self.config.api.public_url)
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── /health                                    # public
/// └── /v1/
///     ├── /auth/login, /auth/refresh             # public
///     ├── /vaults/                               # GET, POST
///     ├── /vaults/:id/                           # GET, PUT, PATCH, DELETE
///     ├── /vaults/:id/contributors/              # GET, POST
///     ├── /vaults/:id/contributors/:user_id/     # DELETE
///     ├── /entries/                              # GET, POST
///     └── /entries/:id/                          # GET, PUT, PATCH, DELETE
/// ```
///
/// Everything under `/v1` except `/auth` sits behind [`auth_layer`].
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let resource_routes = Router::new()
        .route(
            "/vaults/",
            get(routes::vaults::list_vaults).post(routes::vaults::create_vault),
        )
        .route(
            "/vaults/:id/",
            get(routes::vaults::get_vault)
                .put(routes::vaults::replace_vault)
                .patch(routes::vaults::update_vault)
                .delete(routes::vaults::delete_vault),
        )
        .route(
            "/vaults/:id/contributors/",
            get(routes::contributors::list_contributors)
                .post(routes::contributors::add_contributor),
        )
        .route(
            "/vaults/:id/contributors/:user_id/",
            delete(routes::contributors::remove_contributor),
        )
        .route(
            "/entries/",
            get(routes::entries::list_entries).post(routes::entries::create_entry),
        )
        .route(
            "/entries/:id/",
            get(routes::entries::get_entry)
                .put(routes::entries::replace_entry)
                .patch(routes::entries::update_entry)
                .delete(routes::entries::delete_entry),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(resource_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Rejects requests without a valid bearer token, then exposes the caller
/// as an `Extension<AuthContext>`.
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(&state.db, state.jwt_secret(), req.headers())
        .await
        .map_err(|err| {
            tracing::debug!(error = %err, path = %req.uri().path(), "Authentication failed");
            ApiError::from(err)
        })?;

    req.extensions_mut().insert(auth);
    Ok(next.run(req).await)
}
