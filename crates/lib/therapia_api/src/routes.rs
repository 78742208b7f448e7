//! Route path constants.

pub const GET_API_HEALTH: &str = "/api/health";

pub const POST_AUTH_REGISTER: &str = "/api/auth/register";
pub const POST_AUTH_LOGIN: &str = "/api/auth/login";
pub const POST_AUTH_FORGOT_PASSWORD: &str = "/api/auth/forgot-password";
pub const POST_AUTH_VERIFY_RESET_CODE: &str = "/api/auth/verify-reset-code";
pub const POST_AUTH_RESET_PASSWORD: &str = "/api/auth/reset-password";
pub const GET_AUTH_ME: &str = "/api/auth/me";

pub const GET_ACCESS_CHECK_PERMISSION: &str = "/api/access/check/{permission}";

pub const POST_USERS: &str = "/api/users";
pub const THERAPIST_PERMISSIONS: &str = "/api/therapists/{id}/permissions";
