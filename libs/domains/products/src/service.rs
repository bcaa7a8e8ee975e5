//! Product Service - Business logic layer

use axum_helpers::AuthUser;
use futures_util::stream::BoxStream;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::export::csv_lines;
use crate::models::{CreateProduct, CreateReview, Product, ProductPage, ProductQuery, Review, UpdateProduct};
use crate::repository::ProductRepository;

/// Upper bound on compare-and-swap rounds for one review submission
pub const MAX_REVIEW_ATTEMPTS: usize = 16;

pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: CreateProduct, owner: Uuid) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let product = input.into_product(owner)?;
        self.repository.create(product).await
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ProductQuery) -> ProductResult<ProductPage> {
        let pagination = query.pagination();
        let filter = query.filter();

        let total = self.repository.count(filter.clone()).await?;
        let products = self.repository.list(filter, pagination).await?;

        Ok(ProductPage {
            products,
            page: pagination.page,
            total_pages: pagination.total_pages(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn list_my_products(&self, owner: Uuid) -> ProductResult<Vec<Product>> {
        self.repository.list_by_owner(owner).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository
            .update(id, input)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound(id));
        }
        tracing::info!(product_id = %id, "Product removed");
        Ok(())
    }

    /// Appends a review and recomputes the aggregate rating.
    ///
    /// Read-modify-write guarded by the product version; a lost race re-reads
    /// and tries again, up to [`MAX_REVIEW_ATTEMPTS`] times.
    #[instrument(skip(self, reviewer, input), fields(reviewer_id = %reviewer.id))]
    pub async fn add_review(
        &self,
        id: Uuid,
        reviewer: &AuthUser,
        input: CreateReview,
    ) -> ProductResult<Product> {
        let mut product = self.get_product(id).await?;

        let missing = || ProductError::Validation("Rating and comment are required".to_string());
        let rating = input.rating.ok_or_else(missing)?;
        let comment = input
            .comment
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(missing)?;
        let review = Review::new(reviewer.id, reviewer.name.clone(), rating, &comment);

        for attempt in 1..=MAX_REVIEW_ATTEMPTS {
            let expected_version = product.version;
            product.add_review(review.clone())?;
            product.version = expected_version + 1;

            if self
                .repository
                .replace_if_version(product.clone(), expected_version)
                .await?
            {
                tracing::info!(attempt, num_reviews = product.num_reviews, "Review added");
                return Ok(product);
            }

            tracing::debug!(attempt, "Product changed concurrently, retrying review");
            product = self.get_product(id).await?;
        }

        tracing::warn!(product_id = %id, "Review retries exhausted");
        Err(ProductError::ConcurrentUpdate(id))
    }

    /// CSV export of the whole catalog, streamed from the repository.
    #[instrument(skip(self))]
    pub async fn export_csv(&self) -> ProductResult<BoxStream<'static, ProductResult<String>>> {
        let products = self.repository.stream_all().await?;
        Ok(csv_lines(products))
    }
}
