//! Delivery of password-reset codes to their owner.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info};

use super::AuthError;
use crate::models::auth::ResetCode;

/// Delivery channel for reset codes (email, SMS, ...).
#[async_trait]
pub trait ResetCodeNotifier: Send + Sync {
    async fn send_reset_code(
        &self,
        email: &str,
        name: &str,
        reset: &ResetCode,
    ) -> Result<(), AuthError>;
}

/// Writes issuance to the log. The code itself only appears at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl ResetCodeNotifier for LogNotifier {
    async fn send_reset_code(
        &self,
        email: &str,
        _name: &str,
        reset: &ResetCode,
    ) -> Result<(), AuthError> {
        info!(email, expires_at = %reset.expires_at, "password reset code issued");
        debug!(email, code = %reset.code, "password reset code");
        Ok(())
    }
}

/// Keeps every delivered code in memory, newest last.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, ResetCode)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent code delivered to `email`.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, reset)| reset.code.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl ResetCodeNotifier for RecordingNotifier {
    async fn send_reset_code(
        &self,
        email: &str,
        _name: &str,
        reset: &ResetCode,
    ) -> Result<(), AuthError> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((email.to_string(), reset.clone()));
        Ok(())
    }
}
