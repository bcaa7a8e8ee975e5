//! Order owners resolved from the users collection

use async_trait::async_trait;
use domain_orders::{Customer, CustomerDirectory, OrderError, OrderResult};
use domain_users::UserRepository;
use std::sync::Arc;
use uuid::Uuid;

pub struct UserDirectory {
    users: Arc<dyn UserRepository>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl CustomerDirectory for UserDirectory {
    async fn find_customer(&self, id: Uuid) -> OrderResult<Option<Customer>> {
        let user = self
            .users
            .get_by_id(id)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        Ok(user.map(|user| Customer {
            id: user.id,
            name: Some(user.name),
            email: Some(user.email),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_users::{InMemoryUserRepository, User};

    #[tokio::test]
    async fn test_find_customer_copies_name_and_email() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = users
            .create(User::new(
                "Jane".to_string(),
                "Jane@Example.com",
                "hash".to_string(),
            ))
            .await
            .unwrap();

        let directory = UserDirectory::new(users);
        let customer = directory.find_customer(user.id).await.unwrap().unwrap();

        assert_eq!(customer.id, user.id);
        assert_eq!(customer.name.as_deref(), Some("Jane"));
        assert_eq!(customer.email.as_deref(), Some("jane@example.com"));
        assert!(directory.find_customer(Uuid::now_v7()).await.unwrap().is_none());
    }
}
