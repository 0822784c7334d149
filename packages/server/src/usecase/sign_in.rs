//! UseCase: サインイン

use std::sync::Arc;

use crate::domain::{Email, IssuedToken, PasswordHasher, TokenService, User, UserRepository};

use super::error::SignInError;

pub struct SignInUseCase {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_service: Arc<dyn TokenService>,
}

impl SignInUseCase {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            token_service,
        }
    }

    /// メールアドレスとパスワードを検証し、トークンを発行する
    pub async fn execute(
        &self,
        email: String,
        password: String,
    ) -> Result<(User, IssuedToken), SignInError> {
        let email = Email::new(email)?;

        let user = self
            .user_repository
            .find_by_email(&email)
            .await
            .map_err(|_| SignInError::NotFound(email.as_str().to_string()))?;

        if !self.password_hasher.verify(&password, &user.password_hash) {
            tracing::warn!("Invalid password for '{}'", email.as_str());
            return Err(SignInError::InvalidCredentials);
        }

        let token = self
            .token_service
            .issue(&user)
            .map_err(|e| SignInError::Internal(e.to_string()))?;

        tracing::info!("User '{}' signed in", user.id);
        Ok((user, token))
    }
}
