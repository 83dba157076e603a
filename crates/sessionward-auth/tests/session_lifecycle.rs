//! End-to-end behaviour of `SessionManager` over the in-memory stores.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use sessionward_auth::{
    AuthError, JwtDecoder, JwtEncoder, RefreshSecret, RefreshTokenHasher, SessionManager,
};
use sessionward_core::config::{AlertPolicy, AuthConfig, HashingConfig};
use sessionward_core::error::{AppError, ErrorKind};
use sessionward_core::result::AppResult;
use sessionward_database::repositories::{
    MemorySessionRepository, MemoryUserRepository, SessionStore, UserStore,
};
use sessionward_entity::session::{Session, TokenPair};
use sessionward_entity::user::User;
use sessionward_notify::RecordingNotifier;

const EMAIL: &str = "alice@example.com";
const PASSWORD: &str = "correct-horse";

struct Harness {
    manager: SessionManager,
    users: MemoryUserRepository,
    sessions: MemorySessionRepository,
    notifier: RecordingNotifier,
    config: AuthConfig,
}

impl Harness {
    fn new() -> Self {
        Self::with(test_config(), RecordingNotifier::new())
    }

    fn with(config: AuthConfig, notifier: RecordingNotifier) -> Self {
        let users = MemoryUserRepository::new();
        let sessions = MemorySessionRepository::new();
        let manager = SessionManager::new(
            config.clone(),
            Arc::new(users.clone()),
            Arc::new(sessions.clone()),
            Arc::new(notifier.clone()),
        )
        .expect("manager");

        Self {
            manager,
            users,
            sessions,
            notifier,
            config,
        }
    }

    fn decoder(&self) -> JwtDecoder {
        JwtDecoder::new(&self.config).expect("decoder")
    }

    async fn signed_in(&self, ip: IpAddr) -> TokenPair {
        self.manager.sign_up(EMAIL, PASSWORD).await.expect("sign up");
        self.manager.sign_in(EMAIL, PASSWORD, ip).await.expect("sign in")
    }
}

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "lifecycle-test-secret".to_string(),
        hashing: HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..AuthConfig::default()
    }
}

/// User store whose writes always fail with a database error.
#[derive(Debug)]
struct UnavailableUserStore;

#[async_trait]
impl UserStore for UnavailableUserStore {
    async fn create(&self, _user: &User) -> AppResult<()> {
        Err(AppError::database("connection reset by peer"))
    }

    async fn find_by_email(&self, _email: &str) -> AppResult<Option<User>> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<User>> {
        Ok(None)
    }
}

fn build(config: AuthConfig) -> Result<SessionManager, AuthError> {
    SessionManager::new(
        config,
        Arc::new(MemoryUserRepository::new()),
        Arc::new(MemorySessionRepository::new()),
        Arc::new(RecordingNotifier::new()),
    )
}

fn ip_a() -> IpAddr {
    "203.0.113.10".parse().expect("ip")
}

fn ip_b() -> IpAddr {
    "198.51.100.20".parse().expect("ip")
}

#[tokio::test]
async fn test_duplicate_sign_up_conflicts_and_keeps_one_user() {
    let h = Harness::new();
    h.manager.sign_up(EMAIL, PASSWORD).await.expect("first sign up");

    let err = h
        .manager
        .sign_up(EMAIL, "another-password")
        .await
        .expect_err("duplicate");
    assert!(matches!(err, AuthError::UserAlreadyExists));

    let err = h
        .manager
        .sign_up("ALICE@example.com", PASSWORD)
        .await
        .expect_err("case-insensitive duplicate");
    assert!(matches!(err, AuthError::UserAlreadyExists));

    assert_eq!(h.users.len().await, 1);
}

#[tokio::test]
async fn test_sign_up_rejects_bad_input() {
    let h = Harness::new();
    let too_long = "x".repeat(65);

    for (email, password) in [
        ("not-an-email", PASSWORD),
        (EMAIL, "short"),
        (EMAIL, too_long.as_str()),
    ] {
        let err = h.manager.sign_up(email, password).await.expect_err("invalid");
        assert!(matches!(err, AuthError::InvalidCredentials(_)), "{err:?}");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    assert!(h.users.is_empty().await);
}

#[tokio::test]
async fn test_sign_up_store_failure_is_internal() {
    let manager = SessionManager::new(
        test_config(),
        Arc::new(UnavailableUserStore),
        Arc::new(MemorySessionRepository::new()),
        Arc::new(RecordingNotifier::new()),
    )
    .expect("manager");

    let err = manager
        .sign_up(EMAIL, PASSWORD)
        .await
        .expect_err("store down");
    assert!(matches!(err, AuthError::Internal(_)), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Database);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_are_indistinguishable() {
    let h = Harness::new();
    h.manager.sign_up(EMAIL, PASSWORD).await.expect("sign up");

    let unknown = h
        .manager
        .sign_in("bob@example.com", PASSWORD, ip_a())
        .await
        .expect_err("unknown email");
    let wrong = h
        .manager
        .sign_in(EMAIL, "wrong-password", ip_a())
        .await
        .expect_err("wrong password");

    assert!(matches!(unknown, AuthError::UserNotFound));
    assert!(matches!(wrong, AuthError::UserNotFound));
    assert_eq!(unknown.to_string(), wrong.to_string());
    assert!(h.sessions.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_sign_in_token_round_trips_and_resolves_subject() {
    let h = Harness::new();
    let user = h.manager.sign_up(EMAIL, PASSWORD).await.expect("sign up");
    let tokens = h
        .manager
        .sign_in(EMAIL, PASSWORD, ip_a())
        .await
        .expect("sign in");

    let claims = h.decoder().parse_access_token(&tokens.access_token).expect("parse");
    assert_eq!(claims.user_id(), user.id);
    assert_eq!(claims.client_ip(), ip_a());

    let session = h
        .sessions
        .find_by_id(claims.session_id())
        .await
        .expect("lookup")
        .expect("session stored");
    assert!(!session.used);
    assert!(session.previous_session_id.is_none());
    assert_eq!(session.expires_at, tokens.refresh_expires_at);
    assert_ne!(session.refresh_token_hash, tokens.refresh_token);

    let subject = h
        .users
        .find_by_id(claims.user_id())
        .await
        .expect("lookup")
        .expect("subject exists");
    assert_eq!(subject.email, EMAIL);
}

#[tokio::test]
async fn test_refresh_token_is_single_use() {
    let h = Harness::new();
    let first = h.signed_in(ip_a()).await;

    let second = h
        .manager
        .refresh_tokens(ip_a(), &first.access_token, &first.refresh_token)
        .await
        .expect("first rotation");

    let replay = h
        .manager
        .refresh_tokens(ip_a(), &first.access_token, &first.refresh_token)
        .await
        .expect_err("replay");
    assert!(matches!(replay, AuthError::RefreshTokenAlreadyUsed));
    assert_eq!(replay.kind(), ErrorKind::Conflict);

    h.manager
        .refresh_tokens(ip_a(), &second.access_token, &second.refresh_token)
        .await
        .expect("successor rotates");

    let decoder = h.decoder();
    let prior = decoder.parse_access_token(&first.access_token).expect("parse").session_id();
    let next = decoder.parse_access_token(&second.access_token).expect("parse").session_id();
    let successor = h
        .sessions
        .find_by_id(next)
        .await
        .expect("lookup")
        .expect("successor stored");
    assert_eq!(successor.previous_session_id, Some(prior));
    assert!(successor.used);
}

#[tokio::test]
async fn test_expired_session_is_rejected_even_with_matching_secret() {
    let h = Harness::new();
    let user = h.manager.sign_up(EMAIL, PASSWORD).await.expect("sign up");

    let secret = RefreshSecret::generate();
    let hasher = RefreshTokenHasher::new(&h.config.hashing).expect("hasher");
    let session = Session {
        id: Uuid::new_v4(),
        user_id: user.id,
        refresh_token_hash: hasher.hash(secret.expose()).expect("hash"),
        expires_at: Utc::now() - Duration::minutes(1),
        used: false,
        previous_session_id: None,
        created_at: Utc::now() - Duration::hours(1),
    };
    h.sessions.insert(&session).await.expect("insert");

    let (access_token, _) = JwtEncoder::new(&h.config)
        .expect("encoder")
        .issue_access_token(session.id, user.id, ip_a(), Duration::minutes(5))
        .expect("issue");

    let err = h
        .manager
        .refresh_tokens(ip_a(), &access_token, secret.expose())
        .await
        .expect_err("expired");
    assert!(matches!(err, AuthError::RefreshTokenExpired));
    assert_eq!(err.kind(), ErrorKind::Expired);

    let stored = h
        .sessions
        .find_by_id(session.id)
        .await
        .expect("lookup")
        .expect("present");
    assert!(!stored.used);
    assert!(h.sessions.successors_of(session.id).await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rotations_have_exactly_one_winner() {
    let h = Harness::new();
    let tokens = h.signed_in(ip_a()).await;

    let attempts = (0..8).map(|_| {
        let manager = h.manager.clone();
        let tokens = tokens.clone();
        tokio::spawn(async move {
            manager
                .refresh_tokens(ip_a(), &tokens.access_token, &tokens.refresh_token)
                .await
        })
    });

    let results: Vec<_> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.expect("task"))
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let replays = results
        .iter()
        .filter(|r| matches!(r, Err(AuthError::RefreshTokenAlreadyUsed)))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(replays, 7);

    let prior = h
        .decoder()
        .parse_access_token(&tokens.access_token)
        .expect("parse")
        .session_id();
    assert_eq!(h.sessions.successors_of(prior).await.len(), 1);
    assert_eq!(h.sessions.snapshot().await.len(), 2);
}

#[tokio::test]
async fn test_ip_drift_alerts_user_and_binds_new_ip() {
    let h = Harness::new();
    let tokens = h.signed_in(ip_a()).await;

    let rotated = h
        .manager
        .refresh_tokens(ip_b(), &tokens.access_token, &tokens.refresh_token)
        .await
        .expect("rotation");

    let claims = h.decoder().parse_access_token(&rotated.access_token).expect("parse");
    assert_eq!(claims.client_ip(), ip_b());

    let sent = h.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, EMAIL);
    assert!(sent[0].body.contains(&ip_a().to_string()));
    assert!(sent[0].body.contains(&ip_b().to_string()));
}

#[tokio::test]
async fn test_same_ip_rotation_sends_no_alert() {
    let h = Harness::new();
    let tokens = h.signed_in(ip_a()).await;

    h.manager
        .refresh_tokens(ip_a(), &tokens.access_token, &tokens.refresh_token)
        .await
        .expect("rotation");

    assert!(h.notifier.sent().await.is_empty());
}

#[tokio::test]
async fn test_required_alert_failure_surfaces_after_commit() {
    let h = Harness::new();
    let tokens = h.signed_in(ip_a()).await;
    h.notifier.set_failing(true);

    let err = h
        .manager
        .refresh_tokens(ip_b(), &tokens.access_token, &tokens.refresh_token)
        .await
        .expect_err("alert failure");
    assert!(matches!(err, AuthError::Notification(_)));

    // The rotation itself is durable.
    let prior = h
        .decoder()
        .parse_access_token(&tokens.access_token)
        .expect("parse")
        .session_id();
    assert_eq!(h.sessions.successors_of(prior).await.len(), 1);

    let replay = h
        .manager
        .refresh_tokens(ip_b(), &tokens.access_token, &tokens.refresh_token)
        .await
        .expect_err("prior is spent");
    assert!(matches!(replay, AuthError::RefreshTokenAlreadyUsed));
}

#[tokio::test]
async fn test_best_effort_alert_failure_returns_tokens() {
    let config = AuthConfig {
        ip_change_alert: AlertPolicy::BestEffort,
        ..test_config()
    };
    let h = Harness::with(config, RecordingNotifier::new());
    let tokens = h.signed_in(ip_a()).await;
    h.notifier.set_failing(true);

    let rotated = h
        .manager
        .refresh_tokens(ip_b(), &tokens.access_token, &tokens.refresh_token)
        .await
        .expect("rotation despite alert failure");
    assert!(!rotated.refresh_token.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stalled_notifier_times_out() {
    let config = AuthConfig {
        operation_timeout_seconds: 1,
        ..test_config()
    };
    let h = Harness::with(config, RecordingNotifier::stalling(StdDuration::from_secs(30)));
    let tokens = h.signed_in(ip_a()).await;

    match h
        .manager
        .refresh_tokens(ip_b(), &tokens.access_token, &tokens.refresh_token)
        .await
    {
        Err(AuthError::Notification(inner)) => {
            assert_eq!(inner.kind, ErrorKind::Timeout);
            assert!(inner.is_retryable());
        }
        other => panic!("expected notifier timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wrong_secret_is_invalid_and_leaves_session_unused() {
    let h = Harness::new();
    let tokens = h.signed_in(ip_a()).await;

    let err = h
        .manager
        .refresh_tokens(ip_a(), &tokens.access_token, RefreshSecret::generate().expose())
        .await
        .expect_err("wrong secret");
    assert!(matches!(err, AuthError::InvalidRefreshToken));

    h.manager
        .refresh_tokens(ip_a(), &tokens.access_token, &tokens.refresh_token)
        .await
        .expect("original pair still rotates");
}

#[tokio::test]
async fn test_unusable_access_token_is_invalid_refresh() {
    let h = Harness::new();
    let tokens = h.signed_in(ip_a()).await;

    let err = h
        .manager
        .refresh_tokens(ip_a(), "garbage", &tokens.refresh_token)
        .await
        .expect_err("garbage token");
    assert!(matches!(err, AuthError::InvalidRefreshToken));

    let foreign = AuthConfig {
        jwt_secret: "some-other-service".to_string(),
        ..test_config()
    };
    let claims = h.decoder().parse_access_token(&tokens.access_token).expect("parse");
    let (forged, _) = JwtEncoder::new(&foreign)
        .expect("encoder")
        .issue_access_token(claims.session_id(), claims.user_id(), ip_a(), Duration::minutes(5))
        .expect("issue");
    let err = h
        .manager
        .refresh_tokens(ip_a(), &forged, &tokens.refresh_token)
        .await
        .expect_err("foreign signature");
    assert!(matches!(err, AuthError::InvalidRefreshToken));
}

#[tokio::test]
async fn test_expired_access_token_cannot_rotate() {
    let h = Harness::new();
    let tokens = h.signed_in(ip_a()).await;
    let claims = h.decoder().parse_access_token(&tokens.access_token).expect("parse");

    let (stale, _) = JwtEncoder::new(&h.config)
        .expect("encoder")
        .issue_access_token(claims.session_id(), claims.user_id(), ip_a(), Duration::minutes(-1))
        .expect("issue");

    let err = h
        .manager
        .refresh_tokens(ip_a(), &stale, &tokens.refresh_token)
        .await
        .expect_err("stale access token");
    assert!(matches!(err, AuthError::InvalidRefreshToken));

    let session = h
        .sessions
        .find_by_id(claims.session_id())
        .await
        .expect("lookup")
        .expect("present");
    assert!(!session.used);
    assert!(h.sessions.successors_of(session.id).await.is_empty());
}

#[tokio::test]
async fn test_token_for_another_user_cannot_rotate_session() {
    let h = Harness::new();
    let victim = h.signed_in(ip_a()).await;
    let intruder = h
        .manager
        .sign_up("mallory@example.com", PASSWORD)
        .await
        .expect("sign up");

    let victim_sid = h
        .decoder()
        .parse_access_token(&victim.access_token)
        .expect("parse")
        .session_id();
    let (crossed, _) = JwtEncoder::new(&h.config)
        .expect("encoder")
        .issue_access_token(victim_sid, intruder.id, ip_a(), Duration::minutes(5))
        .expect("issue");

    let err = h
        .manager
        .refresh_tokens(ip_a(), &crossed, &victim.refresh_token)
        .await
        .expect_err("subject mismatch");
    assert!(matches!(err, AuthError::InvalidRefreshToken));

    h.manager
        .refresh_tokens(ip_a(), &victim.access_token, &victim.refresh_token)
        .await
        .expect("owner still rotates");
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let h = Harness::new();
    let tokens = h.signed_in(ip_a()).await;
    let claims = h.decoder().parse_access_token(&tokens.access_token).expect("parse");

    let (orphan, _) = JwtEncoder::new(&h.config)
        .expect("encoder")
        .issue_access_token(Uuid::new_v4(), claims.user_id(), ip_a(), Duration::minutes(5))
        .expect("issue");

    let err = h
        .manager
        .refresh_tokens(ip_a(), &orphan, &tokens.refresh_token)
        .await
        .expect_err("orphan session");
    assert!(matches!(err, AuthError::SessionNotFound));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_sign_out_spends_refresh_secret() {
    let h = Harness::new();
    let tokens = h.signed_in(ip_a()).await;

    h.manager.sign_out(&tokens.access_token).await.expect("sign out");

    let err = h
        .manager
        .refresh_tokens(ip_a(), &tokens.access_token, &tokens.refresh_token)
        .await
        .expect_err("signed out");
    assert!(matches!(err, AuthError::RefreshTokenAlreadyUsed));

    let err = h.manager.sign_out("garbage").await.expect_err("bad token");
    assert!(matches!(err, AuthError::TokenInvalid(_)));
}

#[test]
fn test_empty_signing_key_refuses_to_build() {
    let config = AuthConfig {
        jwt_secret: String::new(),
        ..test_config()
    };
    assert!(matches!(build(config), Err(AuthError::SigningKeyMissing)));
}

#[test]
fn test_unusable_lifetimes_refuse_to_build() {
    for config in [
        AuthConfig {
            access_ttl_minutes: 0,
            ..test_config()
        },
        AuthConfig {
            refresh_ttl_hours: 0,
            ..test_config()
        },
        AuthConfig {
            refresh_ttl_hours: u64::MAX,
            ..test_config()
        },
        AuthConfig {
            refresh_ttl_hours: 3_000_000_000_000,
            ..test_config()
        },
        AuthConfig {
            access_ttl_minutes: u64::MAX / 2,
            ..test_config()
        },
    ] {
        match build(config) {
            Err(err @ AuthError::InvalidLifetime(_)) => {
                assert_eq!(err.kind(), ErrorKind::Configuration);
            }
            other => panic!("expected lifetime rejection, got {other:?}"),
        }
    }

    assert!(build(test_config()).is_ok());
}
