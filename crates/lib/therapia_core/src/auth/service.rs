//! Authentication service: registration, login, password reset and
//! bearer-token authentication.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::clock::Clock;
use super::notifier::ResetCodeNotifier;
use super::store::CredentialStore;
use super::{AuthConfig, AuthError, jwt, normalize_email, password, reset_code};
use crate::access::Principal;
use crate::models::auth::{NewCredential, PermissionKind, PublicUser, Role};
use crate::uuid::uuidv7;

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Defaults to [`Role::Parent`].
    pub role: Option<Role>,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed session token.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: PublicUser,
}

/// Authentication service.
///
/// Holds its collaborators behind trait objects so the HTTP layer can share
/// one instance across requests regardless of the backing store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn ResetCodeNotifier>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn ResetCodeNotifier>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            config,
        }
    }

    /// Whether the credential store answers.
    pub async fn store_available(&self) -> bool {
        self.store.ping().await
    }

    /// Self-service sign-up. Creates a PARENT; asking for any other role
    /// fails with [`AuthError::Unauthorized`].
    pub async fn register(&self, input: RegisterInput) -> Result<PublicUser, AuthError> {
        let (email, name) = self.check_new_account(&input).await?;
        if input.role.is_some_and(|role| role != Role::Parent) {
            debug!(email = %email, "self-registration with a privileged role rejected");
            return Err(AuthError::Unauthorized);
        }
        self.insert_user(email, name, input.password, Role::Parent).await
    }

    /// Account creation on behalf of an administrator. Any role may be
    /// assigned; PARENT when omitted.
    pub async fn create_user(&self, input: RegisterInput) -> Result<PublicUser, AuthError> {
        let (email, name) = self.check_new_account(&input).await?;
        let role = input.role.unwrap_or(Role::Parent);
        self.insert_user(email, name, input.password, role).await
    }

    /// Make sure an ADMIN account exists for `email`, creating it if needed.
    /// Fails with [`AuthError::AlreadyExists`] when the email belongs to a
    /// non-admin account.
    pub async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<PublicUser, AuthError> {
        let normalized = normalize_email(email);
        if let Some(existing) = self.store.find_by_email(&normalized).await? {
            if existing.role != Role::Admin {
                return Err(AuthError::AlreadyExists);
            }
            return Ok(existing.to_public());
        }
        let user = self
            .create_user(RegisterInput {
                email: normalized,
                password: password.to_string(),
                name: name.to_string(),
                role: Some(Role::Admin),
            })
            .await?;
        info!(user_id = %user.id, "bootstrap administrator created");
        Ok(user)
    }

    /// Normalize and validate sign-up input, and reject taken emails.
    async fn check_new_account(&self, input: &RegisterInput) -> Result<(String, String), AuthError> {
        let email = normalize_email(&input.email);
        let name = input.name.trim().to_string();
        validate_email(&email)?;
        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".into()));
        }
        self.validate_password(&input.password)?;

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }
        Ok((email, name))
    }

    async fn insert_user(
        &self,
        email: String,
        name: String,
        password: String,
        role: Role,
    ) -> Result<PublicUser, AuthError> {
        let password_hash = password::hash_password_blocking(password).await?;
        let record = self
            .store
            .insert(NewCredential {
                id: uuidv7(),
                email,
                name,
                password_hash,
                role,
                created_at: self.clock.now(),
            })
            .await?;

        info!(user_id = %record.id, email = %record.email, role = %record.role, "user registered");
        Ok(record.to_public())
    }

    /// Check email + password and issue a session token.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, input: LoginInput) -> Result<LoginOutput, AuthError> {
        let email = normalize_email(&input.email);
        let Some(record) = self.store.find_by_email(&email).await? else {
            password::verify_dummy_blocking(input.password).await?;
            debug!(email = %email, "login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password_blocking(input.password, record.password_hash.clone()).await? {
            debug!(user_id = %record.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let lifetime = self.config.session_lifetime(input.remember_me);
        let token =
            jwt::generate_session_token(&record, now, lifetime, self.config.jwt_secret.as_bytes())?;

        info!(user_id = %record.id, remember_me = input.remember_me, "session issued");
        Ok(LoginOutput {
            token,
            expires_at: now + lifetime,
            expires_in: lifetime.num_seconds(),
            user: record.to_public(),
        })
    }

    /// Issue a fresh reset code for `email`, replacing any outstanding one.
    ///
    /// Succeeds silently for unknown emails so callers cannot probe which
    /// accounts exist.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);
        let Some(record) = self.store.find_by_email(&email).await? else {
            debug!(email = %email, "password reset requested for unknown email");
            return Ok(());
        };

        let reset = reset_code::generate_reset_code(self.clock.now(), self.config.reset_code_lifetime());
        if !self.store.set_reset_code(&email, &reset).await? {
            // Record vanished between lookup and update.
            return Ok(());
        }
        self.notifier
            .send_reset_code(&record.email, &record.name, &reset)
            .await
    }

    /// Pure check: does `code` currently unlock a reset for `email`?
    pub async fn verify_reset_code(&self, email: &str, code: &str) -> Result<bool, AuthError> {
        let email = normalize_email(email);
        let now = self.clock.now();
        Ok(self
            .store
            .find_by_email(&email)
            .await?
            .and_then(|record| record.reset)
            .is_some_and(|reset| reset.accepts(code.trim(), now)))
    }

    /// Replace the password using a valid reset code. The code is consumed.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = normalize_email(email);
        let code = code.trim();
        if !self.verify_reset_code(&email, code).await? {
            return Err(AuthError::InvalidOrExpiredCode);
        }
        self.validate_password(new_password)?;

        let new_hash = password::hash_password_blocking(new_password.to_string()).await?;
        // Guarded write: a concurrent reset that consumed the code first wins.
        let applied = self
            .store
            .complete_password_reset(&email, code, self.clock.now(), &new_hash)
            .await?;
        if !applied {
            return Err(AuthError::InvalidOrExpiredCode);
        }

        info!(email = %email, "password reset completed");
        Ok(())
    }

    /// Validate a bearer token and resolve the request's principal.
    ///
    /// Therapist grants are read from the store on every call, so a revoked
    /// permission is effective on the next request.
    pub async fn authenticate_token(&self, token: &str) -> Result<Principal, AuthError> {
        let claims =
            jwt::verify_session_token(token, self.config.jwt_secret.as_bytes(), self.clock.now())?;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Unauthenticated)?;

        let permissions = match claims.role {
            Role::Therapist => self.store.permissions_for(id).await?,
            Role::Admin | Role::Parent => HashMap::new(),
        };

        Ok(Principal {
            id,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            permissions,
        })
    }

    /// Every permission kind with its granted flag for a therapist. Kinds
    /// without a stored grant report `false`.
    pub async fn therapist_permissions(
        &self,
        therapist_id: Uuid,
    ) -> Result<Vec<(PermissionKind, bool)>, AuthError> {
        self.require_therapist(therapist_id).await?;
        let grants = self.store.permissions_for(therapist_id).await?;
        Ok(PermissionKind::ALL
            .into_iter()
            .map(|kind| (kind, grants.get(&kind).copied().unwrap_or(false)))
            .collect())
    }

    /// Upsert grants for a therapist and return the resulting full set.
    pub async fn set_therapist_permissions(
        &self,
        therapist_id: Uuid,
        grants: &[(PermissionKind, bool)],
    ) -> Result<Vec<(PermissionKind, bool)>, AuthError> {
        self.require_therapist(therapist_id).await?;
        for &(kind, granted) in grants {
            self.store.set_permission(therapist_id, kind, granted).await?;
            info!(%therapist_id, permission = %kind, granted, "therapist permission updated");
        }
        self.therapist_permissions(therapist_id).await
    }

    async fn require_therapist(&self, id: Uuid) -> Result<(), AuthError> {
        match self.store.find_by_id(id).await? {
            Some(record) if record.role == Role::Therapist => Ok(()),
            _ => Err(AuthError::NotFound(format!("therapist {id}"))),
        }
    }

    fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.config.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AuthError::Validation("A valid email is required".into())),
    }
}
