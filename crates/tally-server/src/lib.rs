//! Tally Web Server
//!
//! Axum-based HTTP surface for the Tally expense tracker.
//!
//! Security features:
//! - Session login (opaque token in an HttpOnly cookie or a Bearer header)
//! - Sliding session expiry
//! - Restrictive CORS policy
//! - Full audit logging for page views and writes
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use tally_core::auth;
use tally_core::db::Database;
use tally_core::models::User;
use tally_core::Settings;

mod handlers;
mod scheduler;

pub use scheduler::{start_session_sweeper, SessionSweepConfig};

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "tally_session";

/// Authorization header for Bearer sessions
const AUTHORIZATION_HEADER: &str = "authorization";

pub const LOGIN_PATH: &str = "/login/";
pub const DASHBOARD_PATH: &str = "/dashboard/";
pub const EXPENSE_LIST_PATH: &str = "/list/";
pub const PROFILE_PATH: &str = "/profile/";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read `TALLY_ALLOWED_ORIGINS` (comma separated)
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var("TALLY_ALLOWED_ORIGINS")
            .ok()
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        Self { allowed_origins }
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
}

/// The logged-in user, attached to the request by the session middleware
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenSource {
    Cookie,
    Bearer,
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Find the session token: Bearer header first, then the session cookie
fn session_token(headers: &HeaderMap) -> Option<(String, TokenSource)> {
    let bearer = headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some((token.to_string(), TokenSource::Bearer));
    }

    cookie_value(headers, SESSION_COOKIE).map(|t| (t.to_string(), TokenSource::Cookie))
}

/// Raw session token from the request, if any
pub(crate) fn request_token(headers: &HeaderMap) -> Option<String> {
    session_token(headers).map(|(token, _)| token)
}

/// `Set-Cookie` value that stores `token` for `max_age_secs`
pub(crate) fn session_cookie(token: &str, max_age_secs: i64) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    ))
    .ok()
}

/// `Set-Cookie` value that removes the session cookie
pub(crate) fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("tally_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Session middleware - resolves the token and attaches [`CurrentUser`]
///
/// Never rejects on its own: unknown or expired tokens simply leave the
/// request anonymous. Cookie sessions get a refreshed cookie so the
/// browser's expiry slides with the server's.
async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some((token, source)) = session_token(request.headers()) else {
        return next.run(request).await;
    };

    let ttl = state.settings.session_ttl();
    match auth::resume_session(&state.db, &token, ttl) {
        Ok(Some(user)) => {
            debug!(user_id = user.id, path = %request.uri().path(), "Session resumed");
            request.extensions_mut().insert(CurrentUser(user));

            let mut response = next.run(request).await;
            if source == TokenSource::Cookie
                && !response.headers().contains_key(header::SET_COOKIE)
            {
                if let Some(cookie) = session_cookie(&token, state.settings.session_ttl_secs) {
                    response.headers_mut().append(header::SET_COOKIE, cookie);
                }
            }
            response
        }
        Ok(None) => {
            debug!(path = %request.uri().path(), "Unknown or expired session token");
            next.run(request).await
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Login gate for protected pages
///
/// Anonymous GETs are redirected to the login page (with `next`), anything
/// else gets a 401.
async fn require_login(request: Request, next: Next) -> Response {
    if request.extensions().get::<CurrentUser>().is_some() {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    if request.method() == Method::GET || request.method() == Method::HEAD {
        debug!(path = %path, "Redirecting anonymous request to login");
        Redirect::to(&format!("{}?next={}", LOGIN_PATH, path)).into_response()
    } else {
        warn!(path = %path, "Unauthorized request - no valid session");
        AppError::unauthorized("Authentication required").into_response()
    }
}

/// Read a request body as JSON or urlencoded form data, by content type
pub(crate) async fn read_body<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false);

    if is_json {
        let Json(value) = Json::<T>::from_request(request, &())
            .await
            .map_err(|e| AppError::bad_request(&e.body_text()))?;
        Ok(value)
    } else {
        let Form(value) = Form::<T>::from_request(request, &())
            .await
            .map_err(|e| AppError::bad_request(&e.body_text()))?;
        Ok(value)
    }
}

/// Notice returned after a write, with the page the client should show next
#[derive(Serialize)]
pub struct Notice<T: Serialize> {
    pub message: String,
    pub redirect: &'static str,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Notice<T> {
    pub fn new(message: impl Into<String>, redirect: &'static str, data: T) -> Self {
        Self {
            message: message.into(),
            redirect,
            data,
        }
    }
}

/// Create the application router
pub fn create_router(
    db: Database,
    settings: Settings,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    let cors = build_cors(&config);

    let state = Arc::new(AppState { db, settings });

    let public_routes = Router::new()
        .route("/", get(handlers::home))
        .route("/signup/", get(handlers::signup_form).post(handlers::signup))
        .route("/login/", get(handlers::login_form).post(handlers::login))
        .route("/logout/", get(handlers::logout).post(handlers::logout));

    let protected_routes = Router::new()
        .route("/dashboard/", get(handlers::dashboard))
        .route(
            "/add/",
            get(handlers::add_expense_form).post(handlers::add_expense),
        )
        .route("/list/", get(handlers::expense_list))
        .route(
            "/edit/:id/",
            get(handlers::edit_expense_form).post(handlers::edit_expense),
        )
        .route("/delete/:id/", post(handlers::delete_expense))
        .route("/profile/", get(handlers::profile))
        .route(
            "/profile/edit/",
            get(handlers::profile_edit_form).post(handlers::profile_edit),
        )
        .route_layer(middleware::from_fn(require_login));

    // Security headers
    // CSP: restrict scripts to same-origin, allow inline styles, allow data: for chart images
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn build_cors(config: &ServerConfig) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let headers = [header::CONTENT_TYPE, header::AUTHORIZATION];

    if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new().allow_methods(methods).allow_headers(headers)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true)
    }
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    settings: Settings,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    // Drop sessions that expired while the server was down
    match db.purge_expired_sessions() {
        Ok(count) if count > 0 => info!("Purged {} expired session(s)", count),
        Ok(_) => {}
        Err(e) => warn!("Failed to purge expired sessions: {}", e),
    }

    if let Some(sweep) = SessionSweepConfig::from_env() {
        start_session_sweeper(db.clone(), sweep);
    }

    info!(
        session_ttl_secs = settings.session_ttl_secs,
        currency = %settings.currency_symbol,
        "Loaded settings"
    );

    let app = create_router(db, settings, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    /// Individual field problems (validation failures)
    details: Vec<String>,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn with_status(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            details: vec![],
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    fn from_core(err: tally_core::Error) -> Self {
        use tally_core::Error;

        match err {
            Error::NotFound(what) => Self::not_found(&format!("{} not found", what)),
            Error::Validation(details) => Self {
                details,
                ..Self::bad_request("Please correct the errors below.")
            },
            Error::Unauthorized(msg) => Self::unauthorized(&msg),
            Error::InvalidData(msg) => Self::bad_request(&msg),
            other => Self {
                internal: Some(other.into()),
                ..Self::internal("An internal error occurred")
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = if self.details.is_empty() {
            serde_json::json!({ "error": self.message })
        } else {
            serde_json::json!({ "error": self.message, "details": self.details })
        };

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        match err.into().downcast::<tally_core::Error>() {
            Ok(core) => Self::from_core(core),
            Err(err) => Self {
                // Keep full error for logging
                internal: Some(err),
                // Return generic message to client
                ..Self::internal("An internal error occurred")
            },
        }
    }
}
