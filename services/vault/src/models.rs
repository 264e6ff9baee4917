//! Domain entities and API payloads

pub mod password;
pub mod user;

// Re-export for convenience
pub use password::{NewPasswordRecord, PasswordRecord};
pub use user::{
    LoginRequest, LoginResponse, NewUser, RegisterRequest, User, UserProfile, UserSummary,
};
