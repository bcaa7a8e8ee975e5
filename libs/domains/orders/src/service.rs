//! Order Service - checkout and order lookup

use axum_helpers::AuthUser;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::customers::CustomerDirectory;
use crate::error::{OrderError, OrderResult};
use crate::models::{CreateOrder, Customer, Order, OrderDetails};
use crate::repository::OrderRepository;

pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
    customers: Arc<dyn CustomerDirectory>,
}

impl<R: OrderRepository> Clone for OrderService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            customers: Arc::clone(&self.customers),
        }
    }
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: R, customers: Arc<dyn CustomerDirectory>) -> Self {
        Self {
            repository: Arc::new(repository),
            customers,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_order(&self, input: CreateOrder, owner: Uuid) -> OrderResult<Order> {
        let order = input.into_order(owner)?;
        self.repository.create(order).await
    }

    /// Visible to its owner and to admins only. The owner's name and email
    /// are filled in from the customer directory.
    #[instrument(skip(self, requester), fields(requester_id = %requester.id))]
    pub async fn get_order(&self, id: Uuid, requester: &AuthUser) -> OrderResult<OrderDetails> {
        let order = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))?;

        if !requester.can_access(order.user) {
            tracing::warn!(order_id = %id, "Order access denied");
            return Err(OrderError::Forbidden {
                order: id,
                requester: requester.id,
            });
        }

        let customer = match self.customers.find_customer(order.user).await? {
            Some(customer) => customer,
            None => {
                tracing::debug!(owner_id = %order.user, "Order owner has no account record");
                Customer::unknown(order.user)
            }
        };

        Ok(OrderDetails::new(order, customer))
    }

    #[instrument(skip(self))]
    pub async fn list_my_orders(&self, owner: Uuid) -> OrderResult<Vec<Order>> {
        self.repository.list_by_owner(owner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EMPTY_ORDER, OrderItem, ShippingAddress};
    use crate::customers::{InMemoryCustomerDirectory, MockCustomerDirectory};
    use crate::repository::MockOrderRepository;
    use axum_helpers::Role;
    use mockall::predicate;

    fn requester(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::now_v7(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            role,
        }
    }

    fn order_for(owner: Uuid) -> Order {
        CreateOrder {
            order_items: Some(vec![OrderItem {
                product: Uuid::now_v7(),
                name: "Lamp".to_string(),
                qty: 1,
                image: String::new(),
                price: 10.0,
            }]),
            shipping_address: Some(ShippingAddress {
                address: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                postal_code: "12345".to_string(),
                country: "US".to_string(),
            }),
            payment_method: Some("Card".to_string()),
            total_price: Some(10.0),
        }
        .into_order(owner)
        .unwrap()
    }

    fn no_customers() -> Arc<dyn CustomerDirectory> {
        Arc::new(InMemoryCustomerDirectory::new())
    }

    fn repository_holding(order: Order) -> MockOrderRepository {
        let mut mock = MockOrderRepository::new();
        mock.expect_get_by_id()
            .with(predicate::eq(order.id))
            .returning(move |_| Ok(Some(order.clone())));
        mock
    }

    #[tokio::test]
    async fn test_create_order_empty_items() {
        let mut mock = MockOrderRepository::new();
        mock.expect_create().never();

        let service = OrderService::new(mock, no_customers());
        let result = service
            .create_order(
                CreateOrder {
                    order_items: Some(vec![]),
                    ..Default::default()
                },
                Uuid::now_v7(),
            )
            .await;

        assert!(matches!(result, Err(OrderError::Validation(msg)) if msg == EMPTY_ORDER));
    }

    #[tokio::test]
    async fn test_create_order_persists_for_owner() {
        let owner = Uuid::now_v7();
        let mut mock = MockOrderRepository::new();
        mock.expect_create()
            .withf(move |order| order.user == owner)
            .times(1)
            .returning(Ok);

        let template = order_for(owner);
        let input = CreateOrder {
            order_items: Some(template.order_items),
            shipping_address: Some(template.shipping_address),
            payment_method: Some(template.payment_method),
            total_price: Some(template.total_price),
        };

        let service = OrderService::new(mock, no_customers());
        let order = service.create_order(input, owner).await.unwrap();
        assert_eq!(order.user, owner);
    }

    #[tokio::test]
    async fn test_get_order_as_owner() {
        let owner = requester(Role::User);
        let order = order_for(owner.id);
        let id = order.id;

        let service = OrderService::new(repository_holding(order), no_customers());
        let details = service.get_order(id, &owner).await.unwrap();
        assert_eq!(details.id, id);
        assert_eq!(details.user, Customer::unknown(owner.id));
    }

    #[tokio::test]
    async fn test_get_order_fills_in_owner() {
        let owner = requester(Role::User);
        let order = order_for(owner.id);
        let id = order.id;

        let customer = Customer {
            id: owner.id,
            name: Some(owner.name.clone()),
            email: Some(owner.email.clone()),
        };
        let mut customers = MockCustomerDirectory::new();
        let found = customer.clone();
        customers
            .expect_find_customer()
            .with(predicate::eq(owner.id))
            .times(1)
            .returning(move |_| Ok(Some(found.clone())));

        let service = OrderService::new(repository_holding(order), Arc::new(customers));
        let details = service.get_order(id, &requester(Role::Admin)).await.unwrap();
        assert_eq!(details.user, customer);
    }

    #[tokio::test]
    async fn test_forbidden_order_skips_owner_lookup() {
        let order = order_for(Uuid::now_v7());
        let id = order.id;

        let mut customers = MockCustomerDirectory::new();
        customers.expect_find_customer().never();

        let service = OrderService::new(repository_holding(order), Arc::new(customers));
        let result = service.get_order(id, &requester(Role::User)).await;
        assert!(matches!(result, Err(OrderError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_get_order_as_admin() {
        let order = order_for(Uuid::now_v7());
        let id = order.id;

        let service = OrderService::new(repository_holding(order), no_customers());
        assert!(service.get_order(id, &requester(Role::Admin)).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_order_as_stranger_is_forbidden() {
        let order = order_for(Uuid::now_v7());
        let id = order.id;

        let service = OrderService::new(repository_holding(order), no_customers());
        let result = service.get_order(id, &requester(Role::User)).await;
        assert!(matches!(result, Err(OrderError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_get_order_not_found() {
        let mut mock = MockOrderRepository::new();
        mock.expect_get_by_id().returning(|_| Ok(None));

        let service = OrderService::new(mock, no_customers());
        let result = service
            .get_order(Uuid::now_v7(), &requester(Role::Admin))
            .await;
        assert!(matches!(result, Err(OrderError::NotFound(_))));
    }
}
