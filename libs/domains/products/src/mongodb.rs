//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::Utc;
use database::mongodb::uuid_to_bson;
use futures_util::stream::{BoxStream, StreamExt, TryStreamExt};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, to_bson},
    options::{IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{Pagination, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, "products")
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Product>(collection_name),
        }
    }

    /// Initialize indexes for owner, category and name lookups
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "user": 1 })
                .options(IndexOptions::builder().name("idx_owner".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(IndexOptions::builder().name("idx_name".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": uuid_to_bson(id) }
    }

    fn owner_filter(owner: Uuid) -> Document {
        doc! { "user": uuid_to_bson(owner) }
    }

    /// `search` is matched literally: regex metacharacters are escaped.
    fn build_filter(filter: &ProductFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref category) = filter.category {
            doc.insert("category", category);
        }

        if let Some(ref search) = filter.search {
            let pattern = regex::escape(search);
            doc.insert("name", doc! { "$regex": pattern, "$options": "i" });
        }

        doc
    }

    /// `$set` for the fields present in `input`, plus `updatedAt`.
    fn build_update(input: &UpdateProduct) -> ProductResult<Document> {
        let mut set = doc! { "updatedAt": to_bson(&Utc::now())? };

        if let Some(ref name) = input.name {
            set.insert("name", name);
        }
        if let Some(ref description) = input.description {
            set.insert("description", description);
        }
        if let Some(price) = input.price {
            set.insert("price", price);
        }
        if let Some(ref image) = input.image {
            set.insert("image", image);
        }
        if let Some(count) = input.count_in_stock {
            set.insert("countInStock", count);
        }
        if let Some(ref category) = input.category {
            set.insert("category", category);
        }

        Ok(doc! { "$set": set, "$inc": { "__v": 1 } })
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn create(&self, product: Product) -> ProductResult<Product> {
        self.collection.insert_one(&product).await?;

        tracing::info!("Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.collection.find_one(Self::id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> ProductResult<Vec<Product>> {
        let limit = i64::try_from(pagination.limit)
            .map_err(|_| ProductError::Validation("limit out of range".to_string()))?;

        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .sort(doc! { "_id": 1 })
            .skip(pagination.skip())
            .limit(limit)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: ProductFilter) -> ProductResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(&filter))
            .await?)
    }

    #[instrument(skip(self))]
    async fn list_by_owner(&self, owner: Uuid) -> ProductResult<Vec<Product>> {
        let cursor = self
            .collection
            .find(Self::owner_filter(owner))
            .sort(doc! { "_id": 1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Option<Product>> {
        let product = self
            .collection
            .find_one_and_update(Self::id_filter(id), Self::build_update(&input)?)
            .return_document(ReturnDocument::After)
            .await?;

        if product.is_some() {
            tracing::info!("Product updated");
        }
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn replace_if_version(
        &self,
        product: Product,
        expected_version: i64,
    ) -> ProductResult<bool> {
        let mut filter = Self::id_filter(product.id);
        filter.insert("__v", expected_version);
        let result = self.collection.replace_one(filter, &product).await?;
        Ok(result.matched_count == 1)
    }

    #[instrument(skip(self))]
    async fn stream_all(&self) -> ProductResult<BoxStream<'static, ProductResult<Product>>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": 1 }).await?;
        Ok(cursor.map_err(ProductError::from).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProduct;
    use mongodb::{Client, bson::to_raw_document_buf};

    fn product(owner: Uuid) -> Product {
        CreateProduct {
            name: Some("Desk lamp".to_string()),
            price: Some(24.5),
            image: Some("/images/lamp.jpg".to_string()),
            ..Default::default()
        }
        .into_product(owner)
        .unwrap()
    }

    fn stored(product: &Product) -> Document {
        to_raw_document_buf(product).unwrap().to_document().unwrap()
    }

    #[test]
    fn test_id_filter_matches_stored_id() {
        let product = product(Uuid::now_v7());
        let filter = MongoProductRepository::id_filter(product.id);
        assert_eq!(filter.get("_id"), stored(&product).get("_id"));
    }

    #[test]
    fn test_owner_filter_matches_stored_owner() {
        let owner = Uuid::now_v7();
        let filter = MongoProductRepository::owner_filter(owner);
        assert_eq!(filter.get("user"), stored(&product(owner)).get("user"));
    }

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoProductRepository::build_filter(&ProductFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_with_category() {
        let filter = ProductFilter {
            category: Some("lighting".to_string()),
            ..Default::default()
        };
        let doc = MongoProductRepository::build_filter(&filter);
        assert_eq!(doc.get_str("category").unwrap(), "lighting");
    }

    #[test]
    fn test_build_filter_escapes_search() {
        let filter = ProductFilter {
            search: Some("a+b (c)".to_string()),
            ..Default::default()
        };
        let doc = MongoProductRepository::build_filter(&filter);
        let name = doc.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"a\+b \(c\)");
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_build_update_only_present_fields() {
        let update = UpdateProduct {
            price: Some(0.0),
            count_in_stock: Some(0),
            ..Default::default()
        };
        let doc = MongoProductRepository::build_update(&update).unwrap();
        let set = doc.get_document("$set").unwrap();

        assert_eq!(set.get_f64("price").unwrap(), 0.0);
        assert_eq!(set.get_i64("countInStock").unwrap(), 0);
        assert!(set.contains_key("updatedAt"));
        assert!(!set.contains_key("name"));
        assert_eq!(doc.get_document("$inc").unwrap().get_i32("__v").unwrap(), 1);
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_round_trip_against_mongodb() {
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        let db = client.database(&format!("shop_test_{}", Uuid::now_v7().simple()));
        let repo = MongoProductRepository::new(&db);

        let owner = Uuid::now_v7();
        let created = repo.create(product(owner)).await.unwrap();

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Desk lamp");
        assert_eq!(found.user, owner);

        let owned = repo.list_by_owner(owner).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, created.id);

        let mut reviewed = found.clone();
        reviewed
            .add_review(crate::models::Review::new(owner, "Ada", 4.0, "Bright"))
            .unwrap();
        assert!(repo.replace_if_version(reviewed.clone(), 0).await.unwrap());
        assert!(!repo.replace_if_version(reviewed, 0).await.unwrap());

        let after = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(after.num_reviews, 1);
        assert_eq!(after.version, 1);

        db.drop().await.unwrap();
    }
}
