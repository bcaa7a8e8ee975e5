//! Authentication primitives.
//!
//! - [`JwtAuth`] issues and verifies HS256 access tokens
//! - [`bearer_token`] pulls a token from the request headers
//! - [`AuthUser`] is the resolved caller, extracted from request extensions
//!
//! Resolving a token to a stored account is the users domain's job; it
//! installs the [`AuthUser`] that handlers extract.

pub mod config;
pub mod extract;
pub mod identity;
pub mod jwt;

pub use config::JwtConfig;
pub use extract::{ACCESS_TOKEN_COOKIE, bearer_token};
pub use identity::{AuthUser, Role};
pub use jwt::{JwtAuth, JwtClaims};
