//! CampusPay API composition root.

#![forbid(unsafe_code)]

mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use campuspay_application::{AuthEventService, DispatchService, IdentityVerifier, SessionService};
use campuspay_core::{AppError, UniversityId};
use campuspay_infrastructure::{
    DevTokenVerifier, HttpIdentityVerifier, PostgresAuthEventRepository, PostgresProfileRepository,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .unwrap_or_else(|_| "false".to_owned())
        .eq_ignore_ascii_case("true");

    let default_university_id = env::var("DEFAULT_UNIVERSITY_ID")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(|value| {
            uuid::Uuid::parse_str(value.as_str())
                .map(UniversityId::from_uuid)
                .map_err(|error| {
                    AppError::Validation(format!("invalid DEFAULT_UNIVERSITY_ID: {error}"))
                })
        })
        .transpose()?;

    let auth_provider = env::var("AUTH_PROVIDER").unwrap_or_else(|_| "oidc".to_owned());

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    // The external auth collaborator: credential validation is delegated
    // entirely to it; this core only consumes the resulting identity.
    let identity_verifier: Arc<dyn IdentityVerifier> = match auth_provider.as_str() {
        "oidc" => {
            let userinfo_url = Url::parse(&required_non_empty_env("AUTH_USERINFO_URL")?)
                .map_err(|error| {
                    AppError::Validation(format!("invalid AUTH_USERINFO_URL: {error}"))
                })?;
            Arc::new(HttpIdentityVerifier::new(userinfo_url))
        }
        "dev" => Arc::new(DevTokenVerifier::new(required_non_empty_env(
            "AUTH_DEV_SECRET",
        )?)),
        _ => {
            return Err(AppError::Validation(format!(
                "AUTH_PROVIDER must be either 'oidc' or 'dev', got '{auth_provider}'"
            )));
        }
    };

    let auth_event_repository = Arc::new(PostgresAuthEventRepository::new(pool.clone()));
    let auth_event_service = AuthEventService::new(auth_event_repository);

    let profile_repository = Arc::new(PostgresProfileRepository::new(pool.clone()));
    let dispatch_service = DispatchService::new(
        profile_repository,
        auth_event_service.clone(),
        default_university_id,
    );
    let session_service = SessionService::new(identity_verifier, auth_event_service);

    let app_state = AppState {
        dispatch_service,
        session_service,
        frontend_url: frontend_url.clone(),
    };

    // Dispatch routes redirect absent sessions to sign-in instead of
    // answering 401, so they stay outside the require_auth layer.
    let dispatch_routes = Router::new()
        .route("/", get(handlers::root_handler))
        .route("/dashboard", get(handlers::dashboard_handler))
        .route("/admin", get(handlers::admin_handler))
        .route("/admin/employees", get(handlers::admin_handler));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/signin", get(handlers::signin_page_handler))
        .route("/auth/session", post(auth::sign_in_handler))
        .route("/auth/signout", post(auth::sign_out_handler))
        .merge(dispatch_routes)
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "campuspay-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
