use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::JwtAuth;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User, UserResponse, normalize_email};
use crate::repository::UserRepository;

/// Registration, login and profile lookup.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    jwt: JwtAuth,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            jwt: self.jwt.clone(),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, jwt: JwtAuth) -> Self {
        Self::from_shared(Arc::new(repository), jwt)
    }

    /// Shares a repository with the access guard.
    pub fn from_shared(repository: Arc<R>, jwt: JwtAuth) -> Self {
        Self { repository, jwt }
    }

    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<AuthResponse> {
        validate_password(&input.password)?;

        let email = normalize_email(&input.email);
        if self.repository.email_exists(&email).await? {
            return Err(UserError::DuplicateEmail(email));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .repository
            .create(User::new(input.name, &email, password_hash))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.auth_response(user)
    }

    #[instrument(skip(self, input))]
    pub async fn login(&self, input: LoginRequest) -> UserResult<AuthResponse> {
        let email = normalize_email(&input.email);
        let user = self
            .repository
            .get_by_email(&email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::info!(user_id = %user.id, "Login refused for inactive account");
            return Err(UserError::Inactive);
        }

        self.auth_response(user)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<UserResponse> {
        self.repository
            .get_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or(UserError::NotFound(id))
    }

    fn auth_response(&self, user: User) -> UserResult<AuthResponse> {
        let token = self
            .jwt
            .issue(user.id, user.role)
            .map_err(|e| UserError::Token(e.to_string()))?;

        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }
}

fn validate_password(password: &str) -> UserResult<()> {
    let len = password.chars().count();
    if len < 8 {
        return Err(UserError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if len > 128 {
        return Err(UserError::Validation(
            "Password cannot exceed 128 characters".to_string(),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use axum_helpers::{JwtConfig, Role};
    use mockall::predicate;

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!").unwrap())
    }

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Jane".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_lowercases_email_and_issues_token() {
        let mut mock = MockUserRepository::new();
        mock.expect_email_exists()
            .with(predicate::eq("jane@example.com"))
            .returning(|_| Ok(false));
        mock.expect_create().returning(Ok);

        let jwt = jwt();
        let service = UserService::new(mock, jwt.clone());
        let response = service
            .register(register_request("Jane@Example.com", "correct horse"))
            .await
            .unwrap();

        assert_eq!(response.user.email, "jane@example.com");
        let claims = jwt.verify(&response.token).unwrap();
        assert_eq!(claims.sub, response.user.id);
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut mock = MockUserRepository::new();
        mock.expect_email_exists().returning(|_| Ok(true));
        mock.expect_create().never();

        let service = UserService::new(mock, jwt());
        let result = service
            .register(register_request("jane@example.com", "correct horse"))
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let mut mock = MockUserRepository::new();
        mock.expect_email_exists().never();

        let service = UserService::new(mock, jwt());
        let result = service
            .register(register_request("jane@example.com", "short"))
            .await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let stored = User::new(
            "Jane".to_string(),
            "jane@example.com",
            hash_password("correct horse").unwrap(),
        );
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_email()
            .returning(move |_| Ok(Some(stored.clone())));

        let service = UserService::new(mock, jwt());
        let result = service
            .login(LoginRequest {
                email: "jane@example.com".to_string(),
                password: "battery staple".to_string(),
            })
            .await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let mut stored = User::new(
            "Jane".to_string(),
            "jane@example.com",
            hash_password("correct horse").unwrap(),
        );
        stored.is_active = false;
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_email()
            .returning(move |_| Ok(Some(stored.clone())));

        let service = UserService::new(mock, jwt());
        let result = service
            .login(LoginRequest {
                email: "JANE@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await;

        assert!(matches!(result, Err(UserError::Inactive)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_email().returning(|_| Ok(None));

        let service = UserService::new(mock, jwt());
        let result = service
            .login(LoginRequest {
                email: "ghost@example.com".to_string(),
                password: "whatever1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("Correct horse", &hash).unwrap());
    }
}
