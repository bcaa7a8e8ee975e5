//! Shared application state handed to the route builders.

use mongodb::{Client, Database};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    pub db: Database,
}
