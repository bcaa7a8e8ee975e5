//! MongoDB connection management

mod config;
mod connector;
mod health;
mod ids;

pub use config::{DEFAULT_DATABASE, MongoConfig};
pub use connector::{connect, connect_from_config};
pub use health::{HealthStatus, check_health, check_health_detailed};
pub use ids::uuid_to_bson;

pub use mongodb::{Client, Collection, Database};
