//! Session lifecycle manager: sign-up, sign-in, refresh rotation, sign-out.

use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use sessionward_core::config::{AlertPolicy, AuthConfig};
use sessionward_core::error::{AppError, ErrorKind};
use sessionward_core::result::AppResult;
use sessionward_core::timeout::with_deadline;
use sessionward_core::traits::SecurityNotifier;
use sessionward_database::repositories::{SessionStore, Succession, UserStore};
use sessionward_entity::session::{Session, TokenPair};
use sessionward_entity::user::User;

use super::alert::{IP_CHANGE_SUBJECT, ip_change_body};
use crate::error::AuthError;
use crate::jwt::{AccessClaims, JwtDecoder, JwtEncoder};
use crate::password::{PasswordHasher, PasswordValidator};
use crate::refresh::{RefreshSecret, RefreshTokenHasher};

/// Owns every session state transition.
///
/// Holds only `Arc` collaborators and configuration, so clones are cheap
/// and share nothing mutable. All durable state lives behind the stores.
#[derive(Clone)]
pub struct SessionManager {
    /// Identity lookup.
    users: Arc<dyn UserStore>,
    /// Session persistence.
    sessions: Arc<dyn SessionStore>,
    /// IP-change alert delivery.
    notifier: Arc<dyn SecurityNotifier>,
    /// Access-token signer.
    jwt_encoder: Arc<JwtEncoder>,
    /// Access-token verifier.
    jwt_decoder: Arc<JwtDecoder>,
    /// Password hashing.
    password_hasher: Arc<PasswordHasher>,
    /// Sign-up input policy.
    password_validator: PasswordValidator,
    /// Refresh-secret digests.
    refresh_hasher: Arc<RefreshTokenHasher>,
    /// Access-token lifetime.
    access_ttl: Duration,
    /// Session (refresh secret) lifetime.
    refresh_ttl: Duration,
    /// Auth configuration.
    config: AuthConfig,
}

/// Upper bound for either token lifetime.
const MAX_LIFETIME_DAYS: i64 = 3650;

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Builds the engine and its codec from configuration.
    ///
    /// Fails with [`AuthError::SigningKeyMissing`] on an empty signing key and
    /// [`AuthError::InvalidLifetime`] on a zero or oversized TTL, which makes
    /// a misconfigured server refuse to start.
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        notifier: Arc<dyn SecurityNotifier>,
    ) -> Result<Self, AuthError> {
        let access_ttl = checked_lifetime(
            "access_ttl_minutes",
            config.access_ttl_minutes,
            Duration::try_minutes,
        )?;
        let refresh_ttl = checked_lifetime(
            "refresh_ttl_hours",
            config.refresh_ttl_hours,
            Duration::try_hours,
        )?;

        Ok(Self {
            users,
            sessions,
            notifier,
            jwt_encoder: Arc::new(JwtEncoder::new(&config)?),
            jwt_decoder: Arc::new(JwtDecoder::new(&config)?),
            password_hasher: Arc::new(PasswordHasher::new(&config.hashing)?),
            password_validator: PasswordValidator::new(&config),
            refresh_hasher: Arc::new(RefreshTokenHasher::new(&config.hashing)?),
            access_ttl,
            refresh_ttl,
            config,
        })
    }

    /// Registers a new user.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.password_validator.validate_email(email)?;
        self.password_validator.validate(password)?;

        let hasher = Arc::clone(&self.password_hasher);
        let plain = password.to_owned();
        let password_hash = off_runtime(move || hasher.hash_password(&plain)).await?;
        let user = User::new(email, password_hash);

        match self.bounded("user store create", self.users.create(&user)).await {
            Ok(()) => {
                info!(user_id = %user.id, "User registered");
                Ok(user)
            }
            Err(e) if e.kind == ErrorKind::Conflict => {
                debug!("Sign-up rejected: e-mail already registered");
                Err(AuthError::UserAlreadyExists)
            }
            Err(e) => Err(AuthError::Internal(e)),
        }
    }

    /// Authenticates by e-mail and password and opens a new session.
    ///
    /// An unknown e-mail and a wrong password both fail with
    /// [`AuthError::UserNotFound`] after one Argon2 verification each.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
        client_ip: IpAddr,
    ) -> Result<TokenPair, AuthError> {
        let user = self
            .bounded("user store find_by_email", self.users.find_by_email(email))
            .await?;

        let hasher = Arc::clone(&self.password_hasher);
        let plain = password.to_owned();

        let Some(user) = user else {
            off_runtime(move || {
                hasher.verify_decoy(&plain);
                Ok(())
            })
            .await?;
            return Err(AuthError::UserNotFound);
        };

        let digest = user.password_hash.clone();
        if !off_runtime(move || hasher.verify_password(&plain, &digest)).await? {
            debug!(user_id = %user.id, "Sign-in rejected: password mismatch");
            return Err(AuthError::UserNotFound);
        }

        self.create_session(user.id, client_ip).await
    }

    /// Opens a session with no predecessor and returns its token pair.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        client_ip: IpAddr,
    ) -> Result<TokenPair, AuthError> {
        let (session, tokens) = self.mint(user_id, client_ip, None).await?;

        self.bounded("session store insert", self.sessions.insert(&session))
            .await?;

        info!(
            user_id = %user_id,
            session_id = %session.id,
            client_ip = %client_ip,
            "Session created"
        );
        Ok(tokens)
    }

    /// Exchanges a live (access token, refresh secret) pair for a new one.
    ///
    /// The prior session is marked used and its successor inserted as one
    /// atomic store operation, so at most one of several concurrent calls
    /// presenting the same pair succeeds. When the caller's IP differs from
    /// the one bound into the access token, an alert is mailed to the user
    /// after the rotation commits; [`AlertPolicy`] decides whether a failed
    /// alert fails the call.
    pub async fn refresh_tokens(
        &self,
        client_ip: IpAddr,
        access_token: &str,
        refresh_secret: &str,
    ) -> Result<TokenPair, AuthError> {
        let claims = self
            .jwt_decoder
            .parse_access_token(access_token)
            .map_err(|e| {
                debug!(error = %e, "Rotation rejected: access token unusable");
                AuthError::InvalidRefreshToken
            })?;

        let session = self
            .bounded(
                "session store find_by_id",
                self.sessions.find_by_id(claims.session_id()),
            )
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.user_id != claims.user_id() {
            warn!(
                session_id = %session.id,
                token_user_id = %claims.user_id(),
                "Rotation rejected: access token subject does not own session"
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        let hasher = Arc::clone(&self.refresh_hasher);
        let digest = session.refresh_token_hash.clone();
        let candidate = refresh_secret.to_owned();
        if !off_runtime(move || Ok(hasher.verify(&digest, &candidate))).await? {
            debug!(session_id = %session.id, "Rotation rejected: refresh secret mismatch");
            return Err(AuthError::InvalidRefreshToken);
        }

        if session.used {
            warn!(
                user_id = %session.user_id,
                session_id = %session.id,
                client_ip = %client_ip,
                "Refresh token replay detected"
            );
            return Err(AuthError::RefreshTokenAlreadyUsed);
        }

        if session.is_expired_at(Utc::now()) {
            debug!(session_id = %session.id, "Rotation rejected: session expired");
            return Err(AuthError::RefreshTokenExpired);
        }

        let (successor, tokens) = self
            .mint(session.user_id, client_ip, Some(session.id))
            .await?;

        let outcome = self
            .bounded(
                "session store rotate",
                self.sessions.insert_and_mark_prior_used(&successor, session.id),
            )
            .await?;

        match outcome {
            Succession::Committed => {}
            Succession::PriorAlreadyUsed => {
                warn!(
                    user_id = %session.user_id,
                    session_id = %session.id,
                    client_ip = %client_ip,
                    "Refresh token replay detected during rotation"
                );
                return Err(AuthError::RefreshTokenAlreadyUsed);
            }
            Succession::PriorMissing => return Err(AuthError::SessionNotFound),
        }

        info!(
            user_id = %session.user_id,
            prior_session_id = %session.id,
            session_id = %successor.id,
            "Session rotated"
        );

        if claims.client_ip() != client_ip {
            self.alert_ip_change(&claims, client_ip).await?;
        }

        Ok(tokens)
    }

    /// Marks the access token's session used so its refresh secret can no
    /// longer rotate.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let claims = self.jwt_decoder.parse_access_token(access_token)?;

        match self
            .bounded(
                "session store mark_used",
                self.sessions.mark_used(claims.session_id()),
            )
            .await
        {
            Ok(()) => {
                info!(
                    user_id = %claims.user_id(),
                    session_id = %claims.session_id(),
                    "Session signed out"
                );
                Ok(())
            }
            Err(e) if e.kind == ErrorKind::NotFound => Err(AuthError::SessionNotFound),
            Err(e) => Err(AuthError::Internal(e)),
        }
    }

    /// Builds a session row and the token pair that unlocks it.
    async fn mint(
        &self,
        user_id: Uuid,
        client_ip: IpAddr,
        previous_session_id: Option<Uuid>,
    ) -> Result<(Session, TokenPair), AuthError> {
        let session_id = Uuid::new_v4();
        let (access_token, access_expires_at) = self.jwt_encoder.issue_access_token(
            session_id,
            user_id,
            client_ip,
            self.access_ttl,
        )?;

        let hasher = Arc::clone(&self.refresh_hasher);
        let secret = RefreshSecret::generate();
        let (secret, refresh_token_hash) = off_runtime(move || {
            let digest = hasher.hash(secret.expose())?;
            Ok((secret, digest))
        })
        .await?;

        let now = Utc::now();
        let session = Session {
            id: session_id,
            user_id,
            refresh_token_hash,
            expires_at: now + self.refresh_ttl,
            used: false,
            previous_session_id,
            created_at: now,
        };

        let tokens = TokenPair {
            access_token,
            refresh_token: secret.into_inner(),
            access_expires_at,
            refresh_expires_at: session.expires_at,
        };

        Ok((session, tokens))
    }

    async fn alert_ip_change(
        &self,
        claims: &AccessClaims,
        client_ip: IpAddr,
    ) -> Result<(), AuthError> {
        let delivery = async {
            let user = self
                .bounded("user store find_by_id", self.users.find_by_id(claims.user_id()))
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("User {} not found", claims.user_id()))
                })?;

            let body = ip_change_body(claims.client_ip(), client_ip, Utc::now());
            self.bounded(
                "security notifier send",
                self.notifier.send(&user.email, IP_CHANGE_SUBJECT, &body),
            )
            .await?;
            Ok::<(), AppError>(())
        };

        match (delivery.await, self.config.ip_change_alert) {
            (Ok(()), _) => {
                info!(
                    user_id = %claims.user_id(),
                    previous_ip = %claims.client_ip(),
                    client_ip = %client_ip,
                    "IP change alert sent"
                );
                Ok(())
            }
            (Err(e), AlertPolicy::Required) => {
                error!(
                    user_id = %claims.user_id(),
                    error = %e,
                    "IP change alert failed after rotation committed"
                );
                Err(AuthError::Notification(e))
            }
            (Err(e), AlertPolicy::BestEffort) => {
                error!(
                    user_id = %claims.user_id(),
                    error = %e,
                    "IP change alert failed; returning rotated tokens"
                );
                Ok(())
            }
        }
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        with_deadline(self.config.operation_timeout(), operation, fut).await
    }
}

/// Converts a TTL setting to a [`Duration`] in `1..=MAX_LIFETIME_DAYS` days.
fn checked_lifetime(
    setting: &'static str,
    value: u64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, AuthError> {
    i64::try_from(value)
        .ok()
        .and_then(to_duration)
        .filter(|ttl| *ttl > Duration::zero() && *ttl <= Duration::days(MAX_LIFETIME_DAYS))
        .ok_or(AuthError::InvalidLifetime(setting))
}

/// Runs Argon2 work on the blocking pool.
async fn off_runtime<T, F>(work: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        AuthError::Internal(AppError::with_source(
            ErrorKind::Internal,
            "Hashing task did not complete",
            e,
        ))
    })?
}
