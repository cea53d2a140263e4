//! API server configuration.

use chrono::Duration;
use stellar_core::auth::jwt::{DEFAULT_TOKEN_TTL_MINUTES, resolve_jwt_secret};
use tracing::warn;
use uuid::Uuid;

use crate::routes::API_PREFIX;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Lifetime of issued access tokens, in minutes.
    pub token_ttl_minutes: i64,
    /// Scheme and authority used to build resource URLs in responses.
    pub public_base_url: String,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable             | Default                                  |
    /// |----------------------|------------------------------------------|
    /// | `BIND_ADDR`          | `127.0.0.1:5000`                         |
    /// | `DATABASE_URL`       | `postgres://localhost:5432/stellar`      |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file    |
    /// | `TOKEN_TTL_MINUTES`  | `30`                                     |
    /// | `PUBLIC_BASE_URL`    | `http://` + bind address                 |
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".into());
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{bind_addr}"));
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/stellar".into()),
            jwt_secret: resolve_jwt_secret(),
            token_ttl_minutes: ttl_from_env(),
            public_base_url,
            bind_addr,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::minutes(self.token_ttl_minutes)
    }

    /// Absolute URL of a star.
    pub fn star_url(&self, star_id: Uuid) -> String {
        format!(
            "{}{API_PREFIX}/bodies/{star_id}",
            self.public_base_url.trim_end_matches('/')
        )
    }

    /// Absolute URL of a planet within its star.
    pub fn planet_url(&self, star_id: Uuid, planet_id: Uuid) -> String {
        format!("{}/planets/{planet_id}", self.star_url(star_id))
    }
}

fn ttl_from_env() -> i64 {
    match std::env::var("TOKEN_TTL_MINUTES") {
        Err(_) => DEFAULT_TOKEN_TTL_MINUTES,
        Ok(raw) => match raw.trim().parse::<i64>() {
            Ok(minutes) if minutes > 0 => minutes,
            _ => {
                warn!(value = %raw, "ignoring invalid TOKEN_TTL_MINUTES");
                DEFAULT_TOKEN_TTL_MINUTES
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_urls_are_absolute() {
        let config = ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: String::new(),
            jwt_secret: "s".into(),
            token_ttl_minutes: 30,
            public_base_url: "http://localhost:5000/".into(),
        };
        let star = Uuid::nil();
        assert_eq!(
            config.star_url(star),
            format!("http://localhost:5000/api/v1.0/bodies/{star}")
        );
        assert_eq!(
            config.planet_url(star, star),
            format!("http://localhost:5000/api/v1.0/bodies/{star}/planets/{star}")
        );
        assert_eq!(config.token_ttl(), Duration::minutes(30));
    }
}
