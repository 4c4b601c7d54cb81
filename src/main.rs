mod birthday;
mod config;
mod emailjs;
mod error;
mod handlers;
mod types;

use std::sync::Arc;

use axum::extract::{Query, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{any, get, MethodRouter};
use axum::Router;
use chrono::Utc;
use log::{info, warn};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

use config::{ServerConfig, SettingsSource};
use emailjs::EmailJsClient;
use error::AppError;
use handlers::AppState;

const CRON_HEADER: &str = "x-vercel-cron";

async fn cron_auth(
    State(state): State<Arc<AppState>>,
    query: Option<Query<Vec<(String, String)>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let settings = state.settings.load();

    let has_cron_header = req
        .headers()
        .get(CRON_HEADER)
        .map(|v| !v.is_empty())
        .unwrap_or(false);

    let pairs = query.map(|Query(pairs)| pairs).unwrap_or_default();
    let secret = birthday::single_secret(&pairs);

    if !birthday::is_authorized(has_cron_header, secret, settings.cron_secret()) {
        warn!("Rejected birthday cron call without scheduler header or valid secret");
        return Err(AppError::Unauthorized);
    }

    req.extensions_mut().insert(settings);
    Ok(next.run(req).await)
}

/// Permissive CORS headers on every response of `route`, error paths included.
fn with_cors(route: MethodRouter<Arc<AppState>>) -> MethodRouter<Arc<AppState>> {
    route.layer(
        ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET,OPTIONS,PATCH,DELETE,POST,PUT"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(
                    "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, Content-Length, Content-MD5, Content-Type, Date, X-Api-Version",
                ),
            )),
    )
}

fn app(state: Arc<AppState>) -> Router {
    let cron = any(handlers::cron_birthday)
        .layer(middleware::from_fn_with_state(state.clone(), cron_auth));

    Router::new()
        .route("/api/send-email", with_cors(any(handlers::send_email)))
        .route("/api/cron-birthday", cron)
        .route("/api/health", get(handlers::health))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init_timed();

    let server = ServerConfig::from_env();
    info!("EmailJS endpoint: {}", server.emailjs_url);

    let state = Arc::new(AppState {
        emailjs: EmailJsClient::new(server.emailjs_url),
        settings: SettingsSource::Environment,
        clock: Utc::now,
    });

    let addr = format!("0.0.0.0:{}", server.port);
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
