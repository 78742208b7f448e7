//! One-time numeric password-reset codes.

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, rng};

use crate::models::auth::ResetCode;

/// Number of digits in a reset code.
pub const RESET_CODE_DIGITS: usize = 6;

/// Generate a fresh code expiring `lifetime` after `now`.
pub fn generate_reset_code(now: DateTime<Utc>, lifetime: Duration) -> ResetCode {
    let value: u32 = rng().random_range(0..10u32.pow(RESET_CODE_DIGITS as u32));
    ResetCode {
        code: format!("{value:0width$}", width = RESET_CODE_DIGITS),
        expires_at: now + lifetime,
    }
}
