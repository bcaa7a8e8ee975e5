//! Orders Domain
//!
//! Checkout and order history. An order is written once at checkout and
//! afterwards only read, by its owner or an admin.
//!
//! ```rust,ignore
//! use domain_orders::{handlers, MongoOrderRepository, OrderService};
//!
//! let repository = MongoOrderRepository::new(&db);
//! repository.init_indexes().await?;
//! let router = handlers::router(OrderService::new(repository, customers));
//! ```

pub mod customers;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use customers::{CustomerDirectory, InMemoryCustomerDirectory};
pub use error::{OrderError, OrderResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateOrder, Customer, Order, OrderDetails, OrderItem, OrderStatus, ShippingAddress,
};
pub use mongodb::MongoOrderRepository;
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::OrderService;
