use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{Pagination, Product, ProductFilter, UpdateProduct};

/// Repository trait for Product persistence
///
/// Listings are ordered by id, which for UUIDv7 is creation order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// One page of products matching `filter`
    async fn list(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> ProductResult<Vec<Product>>;

    async fn count(&self, filter: ProductFilter) -> ProductResult<u64>;

    async fn list_by_owner(&self, owner: Uuid) -> ProductResult<Vec<Product>>;

    /// Applies the present fields; `None` when the product does not exist
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Option<Product>>;

    async fn delete(&self, id: Uuid) -> ProductResult<bool>;

    /// Replaces the stored document only if its version still equals
    /// `expected_version`. Returns whether the write happened.
    async fn replace_if_version(
        &self,
        product: Product,
        expected_version: i64,
    ) -> ProductResult<bool>;

    /// Every product, streamed
    async fn stream_all(&self) -> ProductResult<BoxStream<'static, ProductResult<Product>>>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<BTreeMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: Product) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|p| filter.matches(p))
            .skip(usize::try_from(pagination.skip()).unwrap_or(usize::MAX))
            .take(usize::try_from(pagination.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: ProductFilter) -> ProductResult<u64> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn list_by_owner(&self, owner: Uuid) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|p| p.user == owner)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Option<Product>> {
        let mut products = self.products.write().await;
        Ok(products.get_mut(&id).map(|product| {
            product.apply_update(input);
            product.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn replace_if_version(
        &self,
        product: Product,
        expected_version: i64,
    ) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        match products.get_mut(&product.id) {
            Some(stored) if stored.version == expected_version => {
                *stored = product;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn stream_all(&self) -> ProductResult<BoxStream<'static, ProductResult<Product>>> {
        let snapshot: Vec<Product> = self.products.read().await.values().cloned().collect();
        Ok(stream::iter(snapshot.into_iter().map(Ok)).boxed())
    }
}
