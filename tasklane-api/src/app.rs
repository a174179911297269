/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasklane_api::{app::{build_router, AppState}, config::Config};
/// use tasklane_shared::notify::{mail::SmtpMailer, templates::TemplateRenderer, Notifier};
/// use tasklane_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let mailer = SmtpMailer::new(&config.notify.smtp())?;
/// let notifier = Notifier::direct(TemplateRenderer::new()?, Arc::new(mailer));
///
/// let state = AppState::new(Arc::new(MemoryStore::new()), config, notifier);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::security::{security_headers, SecurityHeaders},
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tasklane_shared::{
    auth::{jwt::TokenSettings, middleware::authenticate},
    notify::Notifier,
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,

    pub config: Arc<Config>,

    pub notifier: Arc<Notifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config, notifier: Notifier) -> Self {
        Self {
            store,
            config: Arc::new(config),
            notifier: Arc::new(notifier),
        }
    }

    /// Token signing key and password pepper
    pub fn secret(&self) -> &str {
        &self.config.auth.secret_key
    }

    pub fn token_settings(&self) -> TokenSettings {
        self.config.auth.token_settings()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                        public
/// └── /v1
///     ├── /auth                          public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /reset-password
///     ├── GET  /users/me
///     ├── PUT  /users/me/avatar
///     ├── GET|POST   /projects
///     ├── PUT|DELETE /projects/:id
///     ├── POST       /projects/:id/invites
///     ├── GET|POST   /projects/:id/tasks
///     ├── DELETE     /collaborators
///     ├── POST       /invites/:code/accept
///     └── PUT|DELETE /tasks/:id
/// ```
///
/// Everything under `/v1` except `/auth` goes through [`jwt_auth_layer`].
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/reset-password", post(routes::auth::reset_password));

    let protected_routes = Router::new()
        .route("/users/me", get(routes::users::me))
        .route("/users/me/avatar", put(routes::users::set_avatar))
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/projects/:id",
            put(routes::projects::update_project).delete(routes::projects::delete_project),
        )
        .route("/projects/:id/invites", post(routes::invites::create_invite))
        .route(
            "/projects/:id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/collaborators", delete(routes::collaborators::remove_collaborator))
        .route("/invites/:code/accept", post(routes::invites::accept_invite))
        .route(
            "/tasks/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .layer(middleware::from_fn_with_state(state.clone(), jwt_auth_layer));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    let headers = SecurityHeaders {
        hsts: state.config.api.production,
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(middleware::from_fn_with_state(headers, security_headers))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Resolves the `Authorization` header into an `AuthContext` and inserts it
/// into the request extensions.
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let auth = authenticate(state.store.as_ref(), state.secret(), authorization.as_deref()).await?;

    tracing::debug!(user_id = auth.user_id, "Authenticated request");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
