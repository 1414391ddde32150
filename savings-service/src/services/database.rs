use crate::models::{saving::now_millis, Saving, SavingChanges};
use crate::services::filter::SavingFilter;
use crate::services::store::SavingsStore;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

const SAVINGS_COLLECTION: &str = "savings";

#[derive(Clone)]
pub struct MongoSavingsStore {
    client: MongoClient,
    db: Database,
}

impl MongoSavingsStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            // The URI carries credentials; keep it out of the logs.
            tracing::error!(error = %e, "Failed to connect to MongoDB");
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for savings-service");

        let savings = self.savings();

        let date_index = IndexModel::builder()
            .keys(doc! { "date": 1 })
            .options(IndexOptions::builder().name("date_lookup".to_string()).build())
            .build();

        savings.create_index(date_index, None).await.map_err(|e| {
            tracing::error!("Failed to create date index on savings collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created index on savings.date");

        let category_index = IndexModel::builder()
            .keys(doc! { "category": 1, "date": 1 })
            .options(
                IndexOptions::builder()
                    .name("category_lookup".to_string())
                    .build(),
            )
            .build();

        savings.create_index(category_index, None).await.map_err(|e| {
            tracing::error!(
                "Failed to create category index on savings collection: {}",
                e
            );
            AppError::from(e)
        })?;
        tracing::info!("Created index on savings.(category, date)");

        Ok(())
    }

    pub fn savings(&self) -> Collection<Saving> {
        self.db.collection(SAVINGS_COLLECTION)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl SavingsStore for MongoSavingsStore {
    async fn list(&self, filter: SavingFilter) -> Result<Vec<Saving>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "date": 1, "created_at": 1 })
            .build();

        let cursor = self
            .savings()
            .find(filter.to_document(), options)
            .await
            .map_err(AppError::from)?;

        cursor.try_collect().await.map_err(AppError::from)
    }

    async fn insert(&self, saving: Saving) -> Result<Saving, AppError> {
        self.savings()
            .insert_one(&saving, None)
            .await
            .map_err(AppError::from)?;
        Ok(saving)
    }

    async fn update(&self, id: &str, changes: SavingChanges) -> Result<Option<Saving>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.savings()
            .find_one_and_update(
                doc! { "_id": id },
                changes.to_update_document(now_millis()),
                options,
            )
            .await
            .map_err(AppError::from)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = self
            .savings()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(AppError::from)?;
        Ok(result.deleted_count > 0)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
