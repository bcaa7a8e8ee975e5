//! MongoDB implementation of OrderRepository

use async_trait::async_trait;
use database::mongodb::uuid_to_bson;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::OrderResult;
use crate::models::Order;
use crate::repository::OrderRepository;

pub struct MongoOrderRepository {
    collection: Collection<Order>,
}

impl MongoOrderRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Order>("orders"),
        }
    }

    /// Compound owner index serving the newest-first listing
    pub async fn init_indexes(&self) -> OrderResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "user": 1, "_id": -1 })
            .options(
                IndexOptions::builder()
                    .name("idx_owner_newest".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("Order indexes created successfully");
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": uuid_to_bson(id) }
    }

    fn owner_filter(owner: Uuid) -> Document {
        doc! { "user": uuid_to_bson(owner) }
    }
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn create(&self, order: Order) -> OrderResult<Order> {
        self.collection.insert_one(&order).await?;

        tracing::info!("Order created successfully");
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.collection.find_one(Self::id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_by_owner(&self, owner: Uuid) -> OrderResult<Vec<Order>> {
        let cursor = self
            .collection
            .find(Self::owner_filter(owner))
            .sort(doc! { "_id": -1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }
}
