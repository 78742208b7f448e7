//! Authentication configuration.

use chrono::Duration;

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    /// Session lifetime in seconds (default: 28_800 = 8 hours).
    pub session_lifetime_secs: i64,
    /// Session lifetime in seconds when "remember me" is requested
    /// (default: 604_800 = 7 days).
    pub remember_me_lifetime_secs: i64,
    /// Password-reset code lifetime in seconds (default: 900 = 15 minutes).
    pub reset_code_lifetime_secs: i64,
    /// Minimum password length for registration and reset.
    pub min_password_length: usize,
}

impl AuthConfig {
    /// Config with the given secret and default lifetimes.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ..Default::default()
        }
    }

    /// Token lifetime for a login, depending on "remember me".
    pub fn session_lifetime(&self, remember_me: bool) -> Duration {
        if remember_me {
            Duration::seconds(self.remember_me_lifetime_secs)
        } else {
            Duration::seconds(self.session_lifetime_secs)
        }
    }

    pub fn reset_code_lifetime(&self) -> Duration {
        Duration::seconds(self.reset_code_lifetime_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            session_lifetime_secs: 8 * 60 * 60,
            remember_me_lifetime_secs: 7 * 24 * 60 * 60,
            reset_code_lifetime_secs: 15 * 60,
            min_password_length: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_me_selects_long_lifetime() {
        let config = AuthConfig::with_secret("s");
        assert_eq!(config.session_lifetime(false), Duration::hours(8));
        assert_eq!(config.session_lifetime(true), Duration::days(7));
    }
}
