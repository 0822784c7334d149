//! Session identity.
//!
//! A [`SessionContext`] is created empty, filled at sign-in and cleared at
//! logout or as soon as the token is observed past its expiry. It is cloned
//! into every collaborator that needs to authenticate, so there is exactly one
//! identity per session and no process-wide storage.

use std::sync::{Arc, RwLock};

use coderoom_server::{
    domain::{MutationKind, UserId, Username},
    infrastructure::dto::http::AuthResponse,
};
use coderoom_shared::time::{Clock, SystemClock};

use crate::error::{AuthError, ClientError};

/// The signed-in user of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: Username,
    pub email: String,
    pub token: String,
    /// Unix seconds
    pub expires_at: i64,
}

impl Identity {
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        now_secs >= self.expires_at
    }
}

impl TryFrom<AuthResponse> for Identity {
    type Error = ClientError;

    fn try_from(response: AuthResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(response.user.id)?,
            username: Username::new(response.user.username)?,
            email: response.user.email,
            token: response.token,
            expires_at: response.expires_at,
        })
    }
}

#[derive(Clone)]
pub struct SessionContext {
    identity: Arc<RwLock<Option<Identity>>>,
    clock: Arc<dyn Clock>,
}

impl SessionContext {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            identity: Arc::new(RwLock::new(None)),
            clock,
        }
    }

    pub fn sign_in(&self, identity: Identity) {
        tracing::info!("Signed in as {} ({})", identity.username, identity.user_id);
        *self.identity.write().unwrap_or_else(|e| e.into_inner()) = Some(identity);
    }

    pub fn logout(&self) {
        let previous = self
            .identity
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(identity) = previous {
            tracing::info!("Signed out {}", identity.username);
        }
    }

    /// The current identity, if present and not expired.
    ///
    /// An expired identity is discarded on first observation.
    pub fn current(&self) -> Result<Identity, AuthError> {
        let now = self.clock.now_secs();
        let mut slot = self.identity.write().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            None => Err(AuthError::MissingIdentity),
            Some(identity) if identity.is_expired_at(now) => {
                tracing::warn!("Session of {} expired", identity.username);
                *slot = None;
                Err(AuthError::Expired)
            }
            Some(identity) => Ok(identity.clone()),
        }
    }

    /// Id of the signed-in user, used to recognise echoes
    pub fn user_id(&self) -> Option<UserId> {
        self.current().ok().map(|identity| identity.user_id)
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_ok()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

/// Gate in front of every outbound mutation.
#[derive(Clone)]
pub struct IdentityGuard {
    session: SessionContext,
}

impl IdentityGuard {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    /// Identity to publish `kind` with, or `None` when the mutation must be dropped.
    pub fn authorize(&self, kind: MutationKind) -> Option<Identity> {
        match self.session.current() {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!("Dropping {} without a valid identity: {}", kind, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use coderoom_server::infrastructure::dto::http::UserDto;
    use coderoom_shared::time::FixedClock;

    use super::*;

    fn create_identity(expires_at: i64) -> Identity {
        Identity {
            user_id: UserId::new("alice-id").unwrap(),
            username: Username::new("alice").unwrap(),
            email: "a@x.com".to_string(),
            token: "token".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_current_without_sign_in() {
        // テスト項目: サインイン前は MissingIdentity になる
        // given (前提条件):
        let session = SessionContext::new(Arc::new(FixedClock::new(1_000_000)));

        // when (操作):
        let result = session.current();

        // then (期待する結果):
        assert_eq!(result, Err(AuthError::MissingIdentity));
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn test_current_after_sign_in() {
        // テスト項目: サインイン後は期限内の Identity が返る
        // given (前提条件):
        let session = SessionContext::new(Arc::new(FixedClock::new(1_000_000)));
        session.sign_in(create_identity(2_000));

        // when (操作):
        let result = session.current();

        // then (期待する結果):
        assert_eq!(result, Ok(create_identity(2_000)));
        assert_eq!(session.user_id(), Some(UserId::new("alice-id").unwrap()));
    }

    #[test]
    fn test_expired_identity_is_discarded() {
        // テスト項目: 期限切れの Identity は Expired になり、以後は未サインイン扱い
        // given (前提条件):
        // now = 2000 秒、期限 = 2000 秒
        let session = SessionContext::new(Arc::new(FixedClock::new(2_000_000)));
        session.sign_in(create_identity(2_000));

        // when (操作):
        let first = session.current();
        let second = session.current();

        // then (期待する結果):
        assert_eq!(first, Err(AuthError::Expired));
        assert_eq!(second, Err(AuthError::MissingIdentity));
    }

    #[test]
    fn test_logout_clears_identity() {
        // テスト項目: ログアウトで Identity が破棄され、クローンにも反映される
        // given (前提条件):
        let session = SessionContext::new(Arc::new(FixedClock::new(1_000_000)));
        let shared = session.clone();
        session.sign_in(create_identity(2_000));

        // when (操作):
        shared.logout();

        // then (期待する結果):
        assert!(!session.is_signed_in());
    }

    #[test]
    fn test_guard_drops_without_identity() {
        // テスト項目: Identity が無い場合、ガードは None を返す
        // given (前提条件):
        let session = SessionContext::new(Arc::new(FixedClock::new(1_000_000)));
        let guard = IdentityGuard::new(session.clone());

        // when (操作):
        let denied = guard.authorize(MutationKind::Code);
        session.sign_in(create_identity(2_000));
        let allowed = guard.authorize(MutationKind::Code);

        // then (期待する結果):
        assert!(denied.is_none());
        assert_eq!(allowed.map(|i| i.username.into_string()), Some("alice".to_string()));
    }

    #[test]
    fn test_identity_from_auth_response() {
        // テスト項目: サインインのレスポンスから Identity を組み立てられる
        // given (前提条件):
        let response = AuthResponse {
            user: UserDto {
                id: "alice-id".to_string(),
                username: "alice".to_string(),
                email: "a@x.com".to_string(),
                rooms: vec![],
            },
            token: "token".to_string(),
            expires_at: 2_000,
        };

        // when (操作):
        let identity = Identity::try_from(response).unwrap();

        // then (期待する結果):
        assert_eq!(identity, create_identity(2_000));
    }
}
