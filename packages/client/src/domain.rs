//! Domain logic for client-side operations.
//!
//! Pure functions deciding how the CLI reacts to failures.

use crate::error::{AuthError, ClientError};

/// Check if the client should exit immediately based on the error type.
///
/// Identity problems and a missing room will not fix themselves by reconnecting.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    match error {
        ClientError::Auth(_) | ClientError::InvalidInput(_) => true,
        ClientError::Rejected { status, .. } => *status == 404,
        ClientError::ConnectionError(_) | ClientError::ExecutionError(_) => false,
    }
}

/// Check if the client should attempt to reconnect.
///
/// `current_attempt` counts failed attempts so far (0-indexed).
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_exit_immediately(error) {
        return false;
    }
    current_attempt < max_attempts
}

/// Whether the user has to sign in again before continuing
pub fn requires_sign_in(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::Auth(AuthError::MissingIdentity | AuthError::Expired | AuthError::InvalidToken(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_exit_immediately_with_auth_error() {
        // テスト項目: 認証エラーの場合、即座に終了すべきと判定される
        // given (前提条件):
        let error = ClientError::Auth(AuthError::InvalidCredentials);

        // when (操作):
        let result = should_exit_immediately(&error);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_exit_immediately_with_connection_error() {
        // テスト項目: ConnectionError の場合、即座に終了すべきではないと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = should_exit_immediately(&error);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_exit_immediately_with_unknown_room() {
        // テスト項目: Room が存在しない (404) 場合、即座に終了すべきと判定される
        // given (前提条件):
        let missing = ClientError::Rejected {
            status: 404,
            message: "Room 'R9' not found".to_string(),
        };
        let unavailable = ClientError::Rejected {
            status: 503,
            message: "unavailable".to_string(),
        };

        // when (操作) / then (期待する結果):
        assert!(should_exit_immediately(&missing));
        assert!(!should_exit_immediately(&unavailable));
    }

    #[test]
    fn test_reconnect_policy_for_transport_failures() {
        // テスト項目: 接続失敗は上限回数まで再試行され、認証エラーは再試行されない
        // given (前提条件):
        let dropped = ClientError::ConnectionError("connection reset".to_string());
        let expired = ClientError::Auth(AuthError::Expired);

        // when (操作) / then (期待する結果):
        assert!(should_attempt_reconnect(&dropped, 0, 5));
        assert!(should_attempt_reconnect(&dropped, 4, 5));
        assert!(!should_attempt_reconnect(&dropped, 5, 5));
        assert!(!should_attempt_reconnect(&expired, 0, 5));
    }

    #[test]
    fn test_requires_sign_in() {
        // テスト項目: Identity の欠落・期限切れ・拒否のみ再サインインが必要
        // given (前提条件) / when (操作) / then (期待する結果):
        assert!(requires_sign_in(&ClientError::Auth(AuthError::Expired)));
        assert!(requires_sign_in(&ClientError::Auth(AuthError::InvalidToken(
            "bad".to_string()
        ))));
        assert!(!requires_sign_in(&ClientError::Auth(AuthError::AlreadyExists)));
        assert!(!requires_sign_in(&ClientError::ConnectionError("x".to_string())));
    }
}
