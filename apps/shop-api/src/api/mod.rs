//! API routes module
//!
//! Wires the domains to MongoDB and puts every `/api` route behind the
//! access guard.

mod customers;
pub mod health;

use axum::{Router, middleware};
use axum_helpers::JwtAuth;
use domain_orders::{MongoOrderRepository, OrderService};
use domain_products::{MongoProductRepository, ProductService};
use domain_users::{AuthGuard, MongoUserRepository, UserService, auth_guard};
use mongodb::Database;
use std::sync::Arc;
use tracing::info;

use self::customers::UserDirectory;
use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    let jwt = JwtAuth::new(&state.config.jwt);
    let users = Arc::new(MongoUserRepository::new(&state.db));
    let guard = AuthGuard::new(jwt.clone(), users.clone());

    let products = ProductService::new(MongoProductRepository::new(&state.db));
    let orders = OrderService::new(
        MongoOrderRepository::new(&state.db),
        Arc::new(UserDirectory::new(users.clone())),
    );

    Router::new()
        .nest(
            "/auth",
            domain_users::handlers::router(UserService::from_shared(users, jwt)),
        )
        .nest("/products", domain_products::handlers::router(products))
        .nest("/orders", domain_orders::handlers::router(orders))
        .merge(health::router(state.clone()))
        .layer(middleware::from_fn_with_state(guard, auth_guard))
}

/// Creates the indexes every collection relies on
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoUserRepository::new(db)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create user indexes: {}", e))?;
    MongoProductRepository::new(db)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create product indexes: {}", e))?;
    MongoOrderRepository::new(db)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create order indexes: {}", e))?;

    info!("Collection indexes created");
    Ok(())
}
