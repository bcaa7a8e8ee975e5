//! Users Domain
//!
//! Accounts, password login and the access guard that turns a bearer token
//! into an [`axum_helpers::AuthUser`].
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐
//! │  Handlers   │   │    Guard    │  ← /auth endpoints, per-request token check
//! └──────┬──────┘   └──────┬──────┘
//!        │                 │
//! ┌──────▼──────┐          │
//! │   Service   │  ← Argon2 hashing, token issuing
//! └──────┬──────┘          │
//!        │                 │
//! ┌──────▼─────────────────▼──┐
//! │        Repository         │  ← trait + MongoDB / in-memory
//! └───────────────────────────┘
//! ```
//!
//! ```rust,ignore
//! use domain_users::{handlers, AuthGuard, InMemoryUserRepository, UserService};
//!
//! let repository = Arc::new(InMemoryUserRepository::new());
//! let guard = AuthGuard::new(jwt.clone(), repository.clone());
//! let router = handlers::router(UserService::from_shared(repository, jwt));
//! ```

pub mod error;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use guard::{AuthGuard, auth_guard};
pub use handlers::ApiDoc;
pub use models::{AuthResponse, LoginRequest, RegisterRequest, User, UserResponse};
pub use mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
