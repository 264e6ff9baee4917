//! Registration, login and profile lookup
//!
//! Passwords are hashed with Argon2id and a random salt before they reach a
//! store. Login failures use one generic message whether the username or
//! the password was wrong.

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use common::DatabaseError;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    jwt::JwtService,
    models::{
        LoginRequest, LoginResponse, NewUser, RegisterRequest, User, UserProfile, UserSummary,
    },
    repositories::UserStore,
    validation,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const USER_EXISTS: &str = "User already exists";

/// Hash a password into a PHC string with a fresh salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// Check a password against a stored PHC string
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Account operations shared by the HTTP handlers
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_service: JwtService) -> Self {
        Self { users, jwt_service }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Create an account. Does not log the user in.
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<User> {
        validation::validate_registration(&req).map_err(ApiError::BadRequest)?;

        let username = req.username.trim().to_string();
        let email = req.email.trim().to_string();

        if self
            .users
            .find_by_username_or_email(&username, &email)
            .await?
            .is_some()
        {
            warn!("Registration rejected, user exists: {}", username);
            return Err(ApiError::BadRequest(USER_EXISTS.to_string()));
        }

        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| {
                error!("Password hashing task failed: {}", e);
                ApiError::InternalServerError
            })?
            .map_err(|e| {
                error!("{}", e);
                ApiError::InternalServerError
            })?;

        let new_user = NewUser {
            username,
            email,
            password_hash,
        };

        // A concurrent registration can still win the race past the lookup
        let user = self.users.create(&new_user).await.map_err(|e| match e {
            DatabaseError::Duplicate(_) => ApiError::BadRequest(USER_EXISTS.to_string()),
            other => ApiError::Database(other),
        })?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Check credentials and issue a token
    pub async fn login(&self, req: LoginRequest) -> ApiResult<LoginResponse> {
        validation::validate_login(&req).map_err(ApiError::BadRequest)?;

        let username = req.username.trim();
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!("Login failed for unknown user: {}", username);
            return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
        };

        let password_hash = user.password_hash.clone();
        let password = req.password;
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password_hash, &password))
                .await
                .map_err(|e| {
                    error!("Password verification task failed: {}", e);
                    ApiError::InternalServerError
                })?
                .map_err(|e| {
                    error!("Stored hash for user {} is unusable: {}", user.id, e);
                    ApiError::InternalServerError
                })?;

        if !matches {
            warn!("Login failed for user: {}", user.username);
            return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
        }

        let token = self
            .jwt_service
            .issue(user.id, &user.username)
            .map_err(|e| {
                error!("Failed to generate token: {}", e);
                ApiError::InternalServerError
            })?;

        info!("User logged in: {}", user.username);
        Ok(LoginResponse {
            token,
            user: UserSummary::from(&user),
        })
    }

    /// Profile of an authenticated user
    pub async fn profile(&self, user_id: Uuid) -> ApiResult<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtConfig;
    use crate::repositories::memory::MemoryUserStore;

    fn service() -> (AuthService, MemoryUserStore) {
        let store = MemoryUserStore::default();
        let jwt = JwtService::new(JwtConfig::new("test-secret")).unwrap();
        (AuthService::new(Arc::new(store.clone()), jwt), store)
    }

    fn register_req(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn login_req(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_hash_is_salted_and_verifiable() {
        let first = hash_password("secret1").unwrap();
        let second = hash_password("secret1").unwrap();

        assert_ne!(first, "secret1");
        assert_ne!(first, second);
        assert!(verify_password(&first, "secret1").unwrap());
        assert!(!verify_password(&first, "secret2").unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("secret1", "secret1").is_err());
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let (auth, store) = service();
        let user = auth
            .register(register_req("alice", "a@x.com", "secret1"))
            .await
            .unwrap();

        let stored = store.all().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, user.id);
        assert_ne!(stored[0].password_hash, "secret1");
        assert!(!stored[0].password_hash.contains("secret1"));
        assert!(verify_password(&stored[0].password_hash, "secret1").unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_username_is_rejected() {
        let (auth, store) = service();
        auth.register(register_req("alice", "a@x.com", "secret1"))
            .await
            .unwrap();

        let err = auth
            .register(register_req("alice", "other@x.com", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == USER_EXISTS));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_rejected() {
        let (auth, store) = service();
        auth.register(register_req("alice", "a@x.com", "secret1"))
            .await
            .unwrap();

        let err = auth
            .register(register_req("bob", "a@x.com", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_register_missing_field_is_rejected() {
        let (auth, store) = service();
        let err = auth
            .register(register_req("alice", "a@x.com", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_login_issues_token_for_correct_user() {
        let (auth, _) = service();
        let user = auth
            .register(register_req("alice", "a@x.com", "secret1"))
            .await
            .unwrap();

        let response = auth.login(login_req("alice", "secret1")).await.unwrap();
        assert_eq!(response.user.id, user.id);
        assert_eq!(response.user.email, "a@x.com");

        let claims = auth.jwt_service().verify(&response.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn test_login_failures_share_one_message() {
        let (auth, _) = service();
        auth.register(register_req("alice", "a@x.com", "secret1"))
            .await
            .unwrap();

        let wrong_password = auth.login(login_req("alice", "nope")).await.unwrap_err();
        let unknown_user = auth.login(login_req("mallory", "secret1")).await.unwrap_err();

        for err in [wrong_password, unknown_user] {
            assert!(matches!(err, ApiError::BadRequest(ref m) if m == INVALID_CREDENTIALS));
        }
    }

    #[tokio::test]
    async fn test_username_and_email_are_stored_trimmed() {
        let (auth, store) = service();
        auth.register(register_req("  alice ", " a@x.com\t", "secret1"))
            .await
            .unwrap();

        let stored = store.all().await;
        assert_eq!(stored[0].username, "alice");
        assert_eq!(stored[0].email, "a@x.com");

        let err = auth
            .register(register_req("alice", "other@x.com", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == USER_EXISTS));
        assert!(auth.login(login_req(" alice ", "secret1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_profile_for_unknown_user_is_not_found() {
        let (auth, _) = service();
        let err = auth.profile(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
