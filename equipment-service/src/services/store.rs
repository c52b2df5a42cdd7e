use crate::models::{Equipment, EquipmentFields};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use thiserror::Error;

/// Number of records returned by the preview listing.
pub const PREVIEW_LIMIT: i64 = 6;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Equipment not found")]
    NotFound,

    #[error("Store error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(anyhow::Error::new(err))
    }
}

impl StoreError {
    /// Translates the store outcome into an HTTP error. `failure_message` is the
    /// only text a client sees for backend failures.
    pub fn into_app_error(self, failure_message: &str) -> AppError {
        match self {
            StoreError::NotFound => AppError::not_found("Equipment not found"),
            StoreError::Backend(err) => AppError::database(failure_message, err),
        }
    }
}

/// Access to the equipment collection. Every method is a single store call.
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    /// All records in natural order, optionally capped at `limit`.
    async fn list(&self, limit: Option<i64>) -> Result<Vec<Equipment>, StoreError>;

    /// Records whose owner email equals `email`. `None` or an empty string
    /// matches records with an empty, null or missing owner email.
    async fn list_by_owner(&self, email: Option<&str>) -> Result<Vec<Equipment>, StoreError>;

    async fn get(&self, id: ObjectId) -> Result<Equipment, StoreError>;

    /// Inserts a new record and returns its generated identifier. Callers
    /// strip any client supplied `_id` first.
    async fn insert(&self, fields: EquipmentFields) -> Result<ObjectId, StoreError>;

    /// Merges `fields` into the record (`$set` semantics). Callers strip the
    /// identifier from `fields` first.
    async fn update(&self, id: ObjectId, fields: EquipmentFields) -> Result<(), StoreError>;

    async fn delete(&self, id: ObjectId) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
