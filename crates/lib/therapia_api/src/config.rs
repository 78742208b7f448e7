//! API server configuration.

use therapia_core::auth::AuthConfig;

/// Default password-reset code lifetime in minutes.
pub const DEFAULT_RESET_CODE_TTL_MINUTES: i64 = 15;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Password-reset code lifetime in minutes.
    pub reset_code_ttl_minutes: i64,
}

impl ApiConfig {
    /// Auth service configuration derived from this config.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt_secret.clone(),
            reset_code_lifetime_secs: self.reset_code_ttl_minutes * 60,
            ..AuthConfig::default()
        }
    }
}
