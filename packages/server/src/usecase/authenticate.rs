//! UseCase: Bearer トークンによる認証
//!
//! トークンを検証し、対応するユーザーを返します。

use std::sync::Arc;

use crate::domain::{TokenService, User, UserRepository};

use super::error::AuthenticateError;

pub struct AuthenticateUseCase {
    token_service: Arc<dyn TokenService>,
    user_repository: Arc<dyn UserRepository>,
}

impl AuthenticateUseCase {
    pub fn new(
        token_service: Arc<dyn TokenService>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            token_service,
            user_repository,
        }
    }

    pub async fn execute(&self, token: &str) -> Result<User, AuthenticateError> {
        let claims = self.token_service.verify(token)?;
        self.user_repository
            .find_by_id(&claims.user_id)
            .await
            .map_err(|_| AuthenticateError::UnknownUser(claims.user_id.to_string()))
    }
}
