use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation, decode};
use serde::Serialize;
use uuid::Uuid;

use std::sync::Arc;

use crate::{accounts, auth, categories, dashboard, items, transactions};
use engine::Engine;

/// Bearer-token settings, read from the application configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

pub(crate) struct AuthKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub token_ttl_hours: i64,
}

impl From<&AuthConfig> for AuthKeys {
    fn from(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl_hours: config.token_ttl_hours,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub(crate) auth: Arc<AuthKeys>,
}

/// Resolves the bearer token to a user and attaches it to the request.
///
/// Missing, malformed or expired tokens, and tokens whose user no longer
/// exists, are all rejected with 401 before any handler runs.
async fn authenticate(
    State(state): State<ServerState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(bearer)) = bearer else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let token_data = decode::<auth::Claims>(
        bearer.token(),
        &state.auth.decoding,
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user_id =
        Uuid::parse_str(&token_data.claims.sub).map_err(|_| StatusCode::UNAUTHORIZED)?;
    let user = state
        .engine
        .user_by_id(user_id)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health_check() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Builds the application router. Exposed for integration tests.
pub fn app(engine: Engine, auth_config: &AuthConfig) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        auth: Arc::new(AuthKeys::from(auth_config)),
    };
    router(state)
}

fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/health-check", get(health_check));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/{id}",
            put(accounts::update).delete(accounts::remove),
        )
        .route(
            "/accounts/{id}/mark-report-sent",
            post(accounts::mark_report_sent),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::remove),
        )
        .route("/items", get(items::list).post(items::create))
        .route("/items/{id}", put(items::update).delete(items::remove))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            put(transactions::update).delete(transactions::remove),
        )
        .route("/dashboard/stats", get(dashboard::get_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .nest("/api", public.merge(protected))
        .with_state(state)
}

pub async fn run(engine: Engine, auth_config: AuthConfig) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, auth_config, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    auth_config: AuthConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, &auth_config)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    auth_config: AuthConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, auth_config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
