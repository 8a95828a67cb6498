//! Mento: personal and team wellness tracking API.
//!
//! Users record mood/energy check-ins and keep a journal; teams share a
//! room code and see an aggregated wellbeing pulse. Identity comes from an
//! external provider's bearer tokens; data lives in Postgres.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use config::Config;
use db::Gateway;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>, config: Config) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    let protected_routes = Router::new()
        // Profile aggregate
        .route(
            "/api/me",
            get(handlers::profile::get_me).put(handlers::profile::update_me),
        )
        .route("/api/check-ins", post(handlers::profile::create_check_in))
        // Journal
        .route("/api/journal", post(handlers::journal::create_entry))
        .route(
            "/api/journal/:id",
            put(handlers::journal::update_entry).delete(handlers::journal::delete_entry),
        )
        // Teams
        .route(
            "/api/teams",
            get(handlers::teams::list_teams).post(handlers::teams::create_team),
        )
        .route("/api/teams/join", post(handlers::teams::join_team))
        .route(
            "/api/teams/:id/join",
            post(handlers::teams::join_team_by_invite),
        )
        .route(
            "/api/teams/:id/membership",
            axum::routing::delete(handlers::teams::leave_team),
        )
        .route(
            "/api/teams/:id/invite-link",
            get(handlers::teams::invite_link),
        )
        .route("/api/teams/:id/pulse", get(handlers::teams::get_team_pulse))
        // Invite links land here
        .route("/invite/:team_id", get(handlers::invite::accept_invite))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn allowed_origins(config: &Config) -> Vec<HeaderValue> {
    let mut origins: Vec<HeaderValue> = config
        .public_origin
        .parse::<HeaderValue>()
        .into_iter()
        .collect();
    // Extra origins, e.g. testing from another device on the LAN
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<HeaderValue>() {
                origins.push(hv);
            }
        }
    }
    origins
}
