//! Authentication: access tokens, password hashing and the axum guards
//! that enforce them.
//!
//! - [`jwt`]: HS256 access tokens carrying the user id and role
//! - [`password`]: Argon2 password hashes
//! - `middleware`: `require_auth` / `require_admin` layers and the
//!   [`AuthUser`](middleware::AuthUser) extractor (feature `http-server`)

pub mod jwt;
pub mod password;

#[cfg(feature = "http-server")]
pub mod middleware;

pub use jwt::{Claims, JwtService};
pub use password::{hash_password, verify_password};

#[cfg(feature = "http-server")]
pub use middleware::{require_admin, require_auth, AuthUser};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized access")]
    Forbidden,

    #[error("Failed to create token: {0}")]
    TokenCreation(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
