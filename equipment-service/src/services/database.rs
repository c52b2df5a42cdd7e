use crate::models::equipment::{fields_to_document, ID_FIELD, OWNER_EMAIL_FIELD};
use crate::models::{Equipment, EquipmentFields};
use crate::services::store::{EquipmentStore, StoreError};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{ClientOptions, FindOneOptions, FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            AppError::from(e)
        })?;
        options.app_name = Some("equipment-service".to_string());

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, collection = %collection, "MongoDB client ready");
        Ok(Self {
            client,
            db,
            collection: collection.to_string(),
        })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for equipment-service");

        let owner_index = IndexModel::builder()
            .keys(doc! { OWNER_EMAIL_FIELD: 1 })
            .options(
                IndexOptions::builder()
                    .name("owner_email_lookup".to_string())
                    .build(),
            )
            .build();

        self.equipment()
            .create_index(owner_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create owner email index on equipment: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on equipment.userEmail");

        Ok(())
    }

    pub fn equipment(&self) -> Collection<Document> {
        self.db.collection(&self.collection)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Closes the connection pool. Waits for checked out connections to return.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        tracing::info!("MongoDB client shut down");
    }

    async fn find_all(
        &self,
        filter: Document,
        options: Option<FindOptions>,
    ) -> Result<Vec<Equipment>, StoreError> {
        let cursor = self.equipment().find(filter, options).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(listable(documents))
    }
}

/// Converts listed documents, skipping records whose identifier is not an
/// ObjectId. Such records cannot be addressed by the id routes either.
pub fn listable(documents: Vec<Document>) -> Vec<Equipment> {
    documents
        .into_iter()
        .filter_map(|document| {
            let raw_id = document.get(ID_FIELD).cloned();
            match Equipment::from_document(document) {
                Ok(equipment) => Some(equipment),
                Err(e) => {
                    tracing::warn!(id = ?raw_id, "Skipping unlistable equipment record: {}", e);
                    None
                }
            }
        })
        .collect()
}

/// Filter for the owner listing.
///
/// `{ userEmail: null }` matches both explicit nulls and missing fields.
pub fn owner_filter(email: Option<&str>) -> Document {
    match email.filter(|email| !email.is_empty()) {
        Some(email) => doc! { OWNER_EMAIL_FIELD: email },
        None => doc! {
            "$or": [
                { OWNER_EMAIL_FIELD: Bson::Null },
                { OWNER_EMAIL_FIELD: "" },
            ]
        },
    }
}

fn id_filter(id: ObjectId) -> Document {
    doc! { ID_FIELD: id }
}

#[async_trait]
impl EquipmentStore for MongoDb {
    async fn list(&self, limit: Option<i64>) -> Result<Vec<Equipment>, StoreError> {
        let options = limit.map(|limit| FindOptions::builder().limit(limit).build());
        self.find_all(doc! {}, options).await
    }

    async fn list_by_owner(&self, email: Option<&str>) -> Result<Vec<Equipment>, StoreError> {
        self.find_all(owner_filter(email), None).await
    }

    async fn get(&self, id: ObjectId) -> Result<Equipment, StoreError> {
        let document = self
            .equipment()
            .find_one(id_filter(id), None)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(Equipment::from_document(document)?)
    }

    async fn insert(&self, fields: EquipmentFields) -> Result<ObjectId, StoreError> {
        let id = ObjectId::new();
        let mut document = fields_to_document(&fields)?;
        document.insert(ID_FIELD, id);

        self.equipment().insert_one(document, None).await?;
        Ok(id)
    }

    async fn update(&self, id: ObjectId, fields: EquipmentFields) -> Result<(), StoreError> {
        // MongoDB rejects an empty `$set`, so an empty merge is only an existence check.
        if fields.is_empty() {
            let options = FindOneOptions::builder()
                .projection(doc! { ID_FIELD: 1 })
                .build();
            return match self.equipment().find_one(id_filter(id), options).await? {
                Some(_) => Ok(()),
                None => Err(StoreError::NotFound),
            };
        }

        let result = self
            .equipment()
            .update_one(
                id_filter(id),
                doc! { "$set": fields_to_document(&fields)? },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> Result<(), StoreError> {
        let result = self.equipment().delete_one(id_filter(id), None).await?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }
}
