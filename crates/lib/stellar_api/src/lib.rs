//! # stellar_api
//!
//! HTTP API library for Stellar.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::Router;
use axum::routing::{get, post, put};
use stellar_core::audit::AuditLog;
use stellar_core::auth::accounts::Accounts;
use stellar_core::auth::guard::Guard;
use stellar_core::auth::jwt::TokenService;
use stellar_core::bodies::BodyRepository;
use stellar_core::store::Stores;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{accounts, auth, bodies, logs, planets};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub bodies: BodyRepository,
    pub accounts: Accounts,
    pub guard: Guard,
    pub tokens: TokenService,
    pub audit: AuditLog,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Wire the services over one set of stores.
    pub fn new(stores: Stores, config: ApiConfig) -> Self {
        let tokens = TokenService::new(
            config.jwt_secret.as_bytes(),
            config.token_ttl(),
            stores.revocations,
        );
        Self {
            bodies: BodyRepository::new(stores.bodies),
            accounts: Accounts::new(stores.users, tokens.clone()),
            guard: Guard::new(tokens.clone()),
            tokens,
            audit: AuditLog::new(stores.logs),
            config,
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::BODIES, get(bodies::list_stars))
        .route(routes::BODY, get(bodies::get_star))
        .route(routes::PLANETS, get(planets::list_planets))
        .route(routes::PLANET, get(planets::get_planet))
        .route(routes::REGISTER, post(auth::register))
        .route(routes::LOGIN, get(auth::login));

    // Any authenticated user
    let authenticated = Router::new()
        .route(routes::PLANETS, post(planets::add_planet))
        .route(routes::PLANET, put(planets::update_planet))
        .route(routes::LOGOUT, get(auth::logout))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    // Admins only. The last layer added runs first, so authentication
    // precedes the role check.
    let admin = Router::new()
        .route(routes::BODIES, post(bodies::create_star))
        .route(
            routes::BODY,
            put(bodies::update_star).delete(bodies::delete_star),
        )
        .route(
            routes::PLANET,
            axum::routing::delete(planets::remove_planet),
        )
        .route(routes::REGISTER_ADMIN, post(auth::register_admin))
        .route(routes::ACCOUNTS, get(accounts::list_accounts))
        .route(
            routes::ACCOUNT,
            get(accounts::get_account).delete(accounts::delete_account),
        )
        .route(routes::LOGS, get(logs::list_logs).delete(logs::purge_logs))
        .route(routes::USER_ACTIVITY, get(logs::user_activity))
        .route(
            routes::LOG,
            get(logs::list_user_logs).delete(logs::delete_log),
        )
        .route_layer(axum::middleware::from_fn(middleware::auth::require_admin))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let api = Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin);

    Router::new()
        .nest(routes::API_PREFIX, api)
        .layer(cors)
        .with_state(state)
}
