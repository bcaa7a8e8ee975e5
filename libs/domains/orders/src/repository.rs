use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::OrderResult;
use crate::models::Order;

/// Repository trait for Order persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: Order) -> OrderResult<Order>;

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>>;

    /// Orders placed by `owner`, newest first
    async fn list_by_owner(&self, owner: Uuid) -> OrderResult<Vec<Order>>;
}

/// In-memory implementation of OrderRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<BTreeMap<Uuid, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: Order) -> OrderResult<Order> {
        self.orders.write().await.insert(order.id, order.clone());

        tracing::info!(order_id = %order.id, "Created order");
        Ok(order)
    }

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner: Uuid) -> OrderResult<Vec<Order>> {
        let orders = self.orders.read().await;
        // v7 ids sort by creation time
        Ok(orders
            .values()
            .rev()
            .filter(|o| o.user == owner)
            .cloned()
            .collect())
    }
}
