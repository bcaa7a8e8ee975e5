use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 6;
pub const MAX_LIMIT: u64 = 100;

/// A review embedded in its product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Reviewer display name
    pub name: String,
    /// Reviewer id; at most one review per user
    pub user: Uuid,
    /// Expected 1-5, not enforced
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(user: Uuid, name: impl Into<String>, rating: f64, comment: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            user,
            rating,
            comment: comment.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Product entity - represents a product stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    /// Image URL or path
    pub image: String,
    #[serde(default)]
    pub count_in_stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Owner id
    pub user: Uuid,
    #[serde(default)]
    pub reviews: Vec<Review>,
    /// Mean of `reviews[].rating`, 0 when there are none
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: i64,
    /// Bumped on every write; review submission compares and swaps on it
    #[serde(rename = "__v", default)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Appends `review` and recomputes the aggregate.
    ///
    /// Fails without touching `self` when the reviewer already has a review.
    pub fn add_review(&mut self, review: Review) -> ProductResult<()> {
        if self.reviews.iter().any(|r| r.user == review.user) {
            return Err(ProductError::AlreadyReviewed);
        }

        self.reviews.push(review);
        self.recompute_rating();
        self.updated_at = Utc::now();
        Ok(())
    }

    fn recompute_rating(&mut self) {
        self.num_reviews = self.reviews.len() as i64;
        self.rating = if self.reviews.is_empty() {
            0.0
        } else {
            self.reviews.iter().map(|r| r.rating).sum::<f64>() / self.reviews.len() as f64
        };
    }

    /// Applies every field present in `update`, including zero and empty values.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        if let Some(count) = update.count_in_stock {
            self.count_in_stock = count;
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

/// DTO for creating a new product
///
/// Required fields are `Option` so a missing field is a validation error
/// rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(
        required(message = "Missing required product fields"),
        length(min = 1, max = 200)
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(required(message = "Missing required product fields"), range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(required(message = "Missing required product fields"), length(min = 1))]
    pub image: Option<String>,
    #[validate(range(min = 0))]
    pub count_in_stock: Option<i64>,
    pub category: Option<String>,
}

impl CreateProduct {
    /// Builds the new product owned by `owner`. Call after validation.
    pub fn into_product(self, owner: Uuid) -> ProductResult<Product> {
        let missing = || ProductError::Validation("Missing required product fields".to_string());
        let now = Utc::now();

        Ok(Product {
            id: Uuid::now_v7(),
            name: self.name.ok_or_else(missing)?,
            description: self.description.unwrap_or_default(),
            price: self.price.ok_or_else(missing)?,
            image: self.image.ok_or_else(missing)?,
            count_in_stock: self.count_in_stock.unwrap_or(0),
            category: self.category.filter(|c| !c.is_empty()),
            user: owner,
            reviews: Vec::new(),
            rating: 0.0,
            num_reviews: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }
}

/// DTO for updating an existing product; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(length(min = 1))]
    pub image: Option<String>,
    #[validate(range(min = 0))]
    pub count_in_stock: Option<i64>,
    pub category: Option<String>,
}

/// Review request; both fields are checked by the service once the
/// product is known to exist
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateReview {
    pub rating: Option<f64>,
    pub comment: Option<String>,
}

/// Raw listing query. Values arrive as text and are coerced leniently.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Page number, default 1
    pub page: Option<String>,
    /// Page size, default 6, capped at 100
    pub limit: Option<String>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    /// Exact category
    pub category: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(self.limit.as_deref())
                .unwrap_or(DEFAULT_LIMIT)
                .min(MAX_LIMIT),
        }
    }

    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            search: non_blank(self.search.as_deref()),
            category: non_blank(self.category.as_deref()),
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|n| *n >= 1)
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

/// Conjunctive listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let search_ok = self.search.as_ref().is_none_or(|needle| {
            product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let category_ok = self
            .category
            .as_ref()
            .is_none_or(|c| product.category.as_ref() == Some(c));
        search_ok && category_ok
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        CreateProduct {
            name: Some("Lamp".to_string()),
            price: Some(25.0),
            image: Some("/images/lamp.jpg".to_string()),
            ..Default::default()
        }
        .into_product(Uuid::now_v7())
        .unwrap()
    }

    #[test]
    fn test_new_product_defaults() {
        let p = product();
        assert_eq!(p.description, "");
        assert_eq!(p.count_in_stock, 0);
        assert!(p.reviews.is_empty());
        assert_eq!(p.rating, 0.0);
        assert_eq!(p.num_reviews, 0);
        assert_eq!(p.category, None);
    }

    #[test]
    fn test_create_product_requires_name_price_image() {
        let input = CreateProduct {
            name: Some("Lamp".to_string()),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("image"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn test_create_product_rejects_negative_values() {
        let input = CreateProduct {
            name: Some("Lamp".to_string()),
            price: Some(-1.0),
            image: Some("x".to_string()),
            count_in_stock: Some(-3),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
        assert!(errors.field_errors().contains_key("count_in_stock"));
    }

    #[test]
    fn test_add_review_recomputes_mean() {
        let mut p = product();
        p.add_review(Review::new(Uuid::now_v7(), "A", 5.0, "great")).unwrap();
        p.add_review(Review::new(Uuid::now_v7(), "B", 4.0, "good")).unwrap();
        p.add_review(Review::new(Uuid::now_v7(), "C", 4.0, "  fine  ")).unwrap();

        assert_eq!(p.num_reviews, 3);
        assert!((p.rating - 13.0 / 3.0).abs() < 1e-12);
        assert_eq!(p.reviews[2].comment, "fine");
    }

    #[test]
    fn test_add_review_rejects_same_user_and_leaves_state() {
        let mut p = product();
        let user = Uuid::now_v7();
        p.add_review(Review::new(user, "A", 5.0, "great")).unwrap();
        let before = p.clone();

        let result = p.add_review(Review::new(user, "A again", 1.0, "changed my mind"));

        assert!(matches!(result, Err(ProductError::AlreadyReviewed)));
        assert_eq!(p.reviews, before.reviews);
        assert_eq!(p.rating, before.rating);
        assert_eq!(p.num_reviews, 1);
    }

    #[test]
    fn test_same_display_name_different_users_both_accepted() {
        let mut p = product();
        p.add_review(Review::new(Uuid::now_v7(), "Sam", 2.0, "meh")).unwrap();
        p.add_review(Review::new(Uuid::now_v7(), "Sam", 4.0, "nice")).unwrap();
        assert_eq!(p.num_reviews, 2);
        assert_eq!(p.rating, 3.0);
    }

    #[test]
    fn test_apply_update_applies_zero_values() {
        let mut p = product();
        p.description = "bright".to_string();
        p.count_in_stock = 10;

        p.apply_update(UpdateProduct {
            price: Some(0.0),
            count_in_stock: Some(0),
            description: Some(String::new()),
            ..Default::default()
        });

        assert_eq!(p.price, 0.0);
        assert_eq!(p.count_in_stock, 0);
        assert_eq!(p.description, "");
        assert_eq!(p.name, "Lamp");
        assert_eq!(p.image, "/images/lamp.jpg");
        assert_eq!(p.version, 1);
    }

    #[test]
    fn test_pagination_defaults_and_coercion() {
        let q = ProductQuery::default();
        assert_eq!(q.pagination(), Pagination { page: 1, limit: 6 });

        let q = ProductQuery {
            page: Some("abc".to_string()),
            limit: Some("0".to_string()),
            ..Default::default()
        };
        assert_eq!(q.pagination(), Pagination { page: 1, limit: 6 });

        let q = ProductQuery {
            page: Some("-2".to_string()),
            limit: Some("5000".to_string()),
            ..Default::default()
        };
        assert_eq!(q.pagination(), Pagination { page: 1, limit: MAX_LIMIT });

        let q = ProductQuery {
            page: Some(" 3 ".to_string()),
            limit: Some("10".to_string()),
            ..Default::default()
        };
        assert_eq!(q.pagination(), Pagination { page: 3, limit: 10 });
        assert_eq!(q.pagination().skip(), 20);
    }

    #[test]
    fn test_total_pages() {
        let p = Pagination { page: 1, limit: 6 };
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(6), 1);
        assert_eq!(p.total_pages(7), 2);
        assert_eq!(p.total_pages(12), 2);
        assert_eq!(p.total_pages(13), 3);
    }

    #[test]
    fn test_filter_matching() {
        let mut p = product();
        p.category = Some("lighting".to_string());

        let by_search = ProductFilter {
            search: Some("LAM".to_string()),
            category: None,
        };
        assert!(by_search.matches(&p));

        let both = ProductFilter {
            search: Some("lamp".to_string()),
            category: Some("kitchen".to_string()),
        };
        assert!(!both.matches(&p));

        let blank = ProductQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.filter(), ProductFilter::default());
    }

    #[test]
    fn test_product_wire_format() {
        let json = serde_json::to_value(product()).unwrap();
        assert!(json.get("_id").is_some());
        assert!(json.get("countInStock").is_some());
        assert!(json.get("numReviews").is_some());
        assert!(json.get("category").is_none());
    }
}
