//! Application state shared across handlers

use std::sync::Arc;

use crate::{auth::AuthService, jwt::JwtService, repositories::PasswordStore};

/// Application state shared across handlers. Built once at startup; the
/// stores hold clones of the single memoized connection pool.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub password_repository: Arc<dyn PasswordStore>,
}

impl AppState {
    pub fn jwt_service(&self) -> &JwtService {
        self.auth_service.jwt_service()
    }
}
