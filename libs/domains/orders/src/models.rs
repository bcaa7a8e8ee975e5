use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{OrderError, OrderResult};

pub const EMPTY_ORDER: &str = "Order must contain at least one item";
pub const MISSING_DETAILS: &str = "Missing required order details";

/// Orders are placed once and never move on in this system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Placed,
}

/// Snapshot of a product at checkout time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product id; not checked against the catalog
    pub product: Uuid,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1))]
    pub qty: u32,
    #[serde(default)]
    pub image: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub postal_code: String,
    #[validate(length(min = 1))]
    pub country: String,
}

/// Order entity stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Owner id
    pub user: Uuid,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub total_price: f64,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner summary shown on a single order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// `None` once the account is gone
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Customer {
    /// Placeholder for an owner with no account record
    pub fn unknown(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            email: None,
        }
    }
}

/// An order with its owner's name and email filled in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub user: Customer,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub total_price: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderDetails {
    pub fn new(order: Order, user: Customer) -> Self {
        Self {
            id: order.id,
            user,
            order_items: order.order_items,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            total_price: order.total_price,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Checkout request
///
/// Everything is optional on the wire so that missing pieces produce the
/// checkout messages instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    #[validate(nested)]
    pub order_items: Option<Vec<OrderItem>>,
    #[validate(nested)]
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: Option<String>,
    #[validate(range(min = 0.0))]
    pub total_price: Option<f64>,
}

impl CreateOrder {
    /// Checks the checkout rules and builds the order for `owner`.
    ///
    /// An empty item list is reported before anything else, then missing
    /// details, and only then field validation. A zero total or a blank
    /// payment method count as missing.
    pub fn into_order(self, owner: Uuid) -> OrderResult<Order> {
        if self.order_items.as_ref().is_none_or(|items| items.is_empty()) {
            return Err(OrderError::Validation(EMPTY_ORDER.to_string()));
        }

        let missing = || OrderError::Validation(MISSING_DETAILS.to_string());
        let blank_payment = self
            .payment_method
            .as_deref()
            .is_none_or(|m| m.trim().is_empty());
        let no_total = self.total_price.is_none_or(|p| p <= 0.0);
        if self.shipping_address.is_none() || blank_payment || no_total {
            return Err(missing());
        }

        self.validate()
            .map_err(|e| OrderError::Validation(e.to_string()))?;

        let CreateOrder {
            order_items: Some(order_items),
            shipping_address: Some(shipping_address),
            payment_method: Some(payment_method),
            total_price: Some(total_price),
        } = self
        else {
            return Err(missing());
        };

        let now = Utc::now();
        Ok(Order {
            id: Uuid::now_v7(),
            user: owner,
            order_items,
            shipping_address,
            payment_method: payment_method.trim().to_string(),
            total_price,
            status: OrderStatus::Placed,
            created_at: now,
            updated_at: now,
        })
    }
}
