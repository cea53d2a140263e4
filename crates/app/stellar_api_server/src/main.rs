//! Stellar API server binary.

use std::time::Duration;

use clap::Parser;
use stellar_api::AppState;
use stellar_api::config::ApiConfig;
use stellar_core::auth::jwt::TokenService;
use stellar_core::auth::AuthError;
use stellar_core::db::{self, DEFAULT_MAX_CONNECTIONS};
use stellar_core::fields::FormFields;
use stellar_core::store::Stores;
use tracing::{debug, info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "stellar_api_server", about = "Stellar REST API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:5000")]
    bind: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/stellar"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    max_connections: u32,

    /// Keep all data in process memory instead of PostgreSQL.
    #[arg(long, default_value_t = false)]
    in_memory: bool,

    /// Access token lifetime in minutes.
    #[arg(long, env = "TOKEN_TTL_MINUTES")]
    token_ttl_minutes: Option<i64>,

    /// Seconds between sweeps of expired revocation entries.
    #[arg(long, default_value_t = 300)]
    revocation_gc_secs: u64,

    /// Create this admin account at startup if it does not exist yet.
    #[arg(long, env = "ADMIN_USERNAME", requires = "admin_password")]
    admin_username: Option<String>,

    #[arg(long, env = "ADMIN_PASSWORD")]
    admin_password: Option<String>,

    #[arg(long, env = "ADMIN_EMAIL")]
    admin_email: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stellar_api=debug,stellar_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    config.bind_addr = args.bind.clone();
    config.database_url = args.database_url.clone();
    if let Some(minutes) = args.token_ttl_minutes.filter(|m| *m > 0) {
        config.token_ttl_minutes = minutes;
    }

    info!(
        bind = %config.bind_addr,
        in_memory = args.in_memory,
        token_ttl_minutes = config.token_ttl_minutes,
        "starting stellar_api_server"
    );

    let stores = if args.in_memory {
        warn!("in-memory mode: all data is lost on exit");
        Stores::in_memory()
    } else {
        info!(max_connections = args.max_connections, "connecting to database");
        Stores::postgres(db::connect(&config.database_url, args.max_connections).await?)
    };

    let state = AppState::new(stores, config.clone());

    if let (Some(username), Some(password)) = (&args.admin_username, &args.admin_password) {
        bootstrap_admin(&state, username, password, args.admin_email.as_deref()).await?;
    }

    tokio::spawn(sweep_revocations(
        state.tokens.clone(),
        Duration::from_secs(args.revocation_gc_secs.max(1)),
    ));

    let app = stellar_api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}

/// Register the configured admin unless the username is already taken.
async fn bootstrap_admin(
    state: &AppState,
    username: &str,
    password: &str,
    email: Option<&str>,
) -> Result<(), AuthError> {
    if state.accounts.find(username).await.is_ok() {
        debug!(user = username, "admin account already present");
        return Ok(());
    }
    let email = email
        .map(str::to_string)
        .unwrap_or_else(|| format!("{username}@localhost"));
    let form: FormFields = [
        ("username", username),
        ("password", password),
        ("email", email.as_str()),
        ("forename", username),
        ("surname", "Admin"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    state.accounts.register(&form, true).await?;
    info!(user = username, "bootstrap admin created");
    Ok(())
}

/// Periodically drop revocation entries whose tokens have expired anyway.
async fn sweep_revocations(tokens: TokenService, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        match tokens.purge_revocations().await {
            Ok(0) => {}
            Ok(purged) => debug!(purged, "revocation sweep"),
            Err(e) => warn!("revocation sweep failed: {e}"),
        }
    }
}
