//! Server configuration.
//!
//! Everything is read from the environment once at startup; defaults suit
//! local development against the Vite dev server.
//!
//! | Variable               | Default                 |
//! |------------------------|-------------------------|
//! | `BIND_ADDR`            | `0.0.0.0:3000`          |
//! | `CORS_ORIGINS`         | `http://localhost:5173` |
//! | `REQUEST_TIMEOUT_SECS` | `30`                    |
//! | `JWT_SECRET`           | — (required)            |
//! | `JWT_TOKEN_TTL_MINS`   | `60`                    |

use std::net::SocketAddr;
use std::time::Duration;

use crate::auth::jwt::JwtConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket the server listens on.
    pub bind_addr: SocketAddr,
    /// Origins the dashboard frontend may call from.
    pub cors_origins: Vec<String>,
    /// Per-request deadline.
    pub request_timeout: Duration,
    /// Access-token signing configuration.
    pub jwt: JwtConfig,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    /// Load configuration from the environment.
    ///
    /// # Panics
    ///
    /// Panics on an unparseable `BIND_ADDR` or `REQUEST_TIMEOUT_SECS`, or a
    /// missing `JWT_SECRET` — all startup-time operator errors.
    pub fn from_env() -> Self {
        let bind_addr = env_or("BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse()
            .expect("BIND_ADDR must be a host:port socket address");

        let cors_origins = env_or("CORS_ORIGINS", DEFAULT_CORS_ORIGIN)
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let request_timeout = Duration::from_secs(
            env_or(
                "REQUEST_TIMEOUT_SECS",
                &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            )
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a number of seconds"),
        );

        Self {
            bind_addr,
            cors_origins,
            request_timeout,
            jwt: JwtConfig::from_env(),
        }
    }
}
