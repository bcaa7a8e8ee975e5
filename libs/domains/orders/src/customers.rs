//! Owner lookup for order details
//!
//! Accounts live in the users domain; the application supplies a
//! [`CustomerDirectory`] backed by it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::OrderResult;
use crate::models::Customer;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Name and email of the account `id`, if it still exists
    async fn find_customer(&self, id: Uuid) -> OrderResult<Option<Customer>>;
}

/// In-memory directory (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCustomerDirectory {
    customers: Arc<RwLock<HashMap<Uuid, Customer>>>,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, customer: Customer) {
        self.customers.write().await.insert(customer.id, customer);
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn find_customer(&self, id: Uuid) -> OrderResult<Option<Customer>> {
        Ok(self.customers.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find() {
        let directory = InMemoryCustomerDirectory::new();
        let id = Uuid::now_v7();
        directory
            .insert(Customer {
                id,
                name: Some("Jane".to_string()),
                email: Some("jane@example.com".to_string()),
            })
            .await;

        let found = directory.find_customer(id).await.unwrap().unwrap();
        assert_eq!(found.name.as_deref(), Some("Jane"));
        assert!(directory.find_customer(Uuid::now_v7()).await.unwrap().is_none());
    }
}
