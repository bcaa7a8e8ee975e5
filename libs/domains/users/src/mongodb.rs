//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use database::mongodb::uuid_to_bson;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>("users"),
        }
    }

    /// Unique email index; backs the duplicate-email check under races.
    pub async fn init_indexes(&self) -> UserResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_email_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": uuid_to_bson(id) }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> UserResult<User> {
        match self.collection.insert_one(&user).await {
            Ok(_) => {
                tracing::info!("User created");
                Ok(user)
            }
            Err(e) if is_duplicate_key(&e) => Err(UserError::DuplicateEmail(user.email)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(Self::id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "email": email })
            .limit(1)
            .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::{Client, bson::to_raw_document_buf};

    fn user() -> User {
        User::new(
            "Ada".to_string(),
            &format!("ada+{}@example.com", Uuid::now_v7().simple()),
            "$argon2id$stub".to_string(),
        )
    }

    #[test]
    fn test_id_filter_matches_stored_id() {
        let user = user();
        let stored = to_raw_document_buf(&user).unwrap().to_document().unwrap();
        let filter = MongoUserRepository::id_filter(user.id);
        assert_eq!(filter.get("_id"), stored.get("_id"));
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_round_trip_against_mongodb() {
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        let db = client.database(&format!("shop_test_{}", Uuid::now_v7().simple()));
        let repo = MongoUserRepository::new(&db);
        repo.init_indexes().await.unwrap();

        let created = repo.create(user()).await.unwrap();

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.email, created.email);
        assert!(repo.get_by_id(Uuid::now_v7()).await.unwrap().is_none());

        let duplicate = User {
            id: Uuid::now_v7(),
            ..created.clone()
        };
        assert!(matches!(
            repo.create(duplicate).await,
            Err(UserError::DuplicateEmail(_))
        ));

        db.drop().await.unwrap();
    }
}
