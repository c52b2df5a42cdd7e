#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use equipment_service::config::{CorsConfig, EquipmentConfig, MongoConfig};
use equipment_service::models::equipment::{fields_to_document, ID_FIELD, OWNER_EMAIL_FIELD};
use equipment_service::models::{Equipment, EquipmentFields};
use equipment_service::services::{EquipmentStore, StoreError};
use equipment_service::startup::{router, AppState};
use http_body_util::BodyExt;
use mongodb::bson::oid::ObjectId;
use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// In-memory stand-in for the MongoDB collection, preserving insertion order.
/// Fields go through the same BSON conversion as the real store.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Equipment>>,
    calls: AtomicUsize,
    unavailable: bool,
}

impl MemoryStore {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Number of store operations performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn enter(&self) -> Result<std::sync::MutexGuard<'_, Vec<Equipment>>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(StoreError::Backend(anyhow::anyhow!("server selection timeout")));
        }
        Ok(self.records.lock().unwrap())
    }
}

fn owner_matches(record: &Equipment, email: Option<&str>) -> bool {
    match email.filter(|email| !email.is_empty()) {
        Some(email) => record.fields.get(OWNER_EMAIL_FIELD) == Some(&Value::from(email)),
        None => match record.fields.get(OWNER_EMAIL_FIELD) {
            None | Some(Value::Null) => true,
            Some(Value::String(email)) => email.is_empty(),
            Some(_) => false,
        },
    }
}

#[async_trait]
impl EquipmentStore for MemoryStore {
    async fn list(&self, limit: Option<i64>) -> Result<Vec<Equipment>, StoreError> {
        let records = self.enter()?;
        let take = limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(records.iter().take(take).cloned().collect())
    }

    async fn list_by_owner(&self, email: Option<&str>) -> Result<Vec<Equipment>, StoreError> {
        let records = self.enter()?;
        Ok(records
            .iter()
            .filter(|record| owner_matches(record, email))
            .cloned()
            .collect())
    }

    async fn get(&self, id: ObjectId) -> Result<Equipment, StoreError> {
        let records = self.enter()?;
        records
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    // Like MongoDB, a client supplied `_id` is kept as is; a non-ObjectId one
    // makes the record unreadable.
    async fn insert(&self, fields: EquipmentFields) -> Result<ObjectId, StoreError> {
        let mut records = self.enter()?;
        let mut document = fields_to_document(&fields)?;
        if !document.contains_key(ID_FIELD) {
            document.insert(ID_FIELD, ObjectId::new());
        }
        let record = Equipment::from_document(document)?;
        let id = record.id;
        records.push(record);
        Ok(id)
    }

    async fn update(&self, id: ObjectId, fields: EquipmentFields) -> Result<(), StoreError> {
        let mut records = self.enter()?;
        let mut document = fields_to_document(&fields)?;
        if document.contains_key(ID_FIELD) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "Performing an update on the path '_id' would modify the immutable field '_id'"
            )));
        }
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(StoreError::NotFound)?;
        document.insert(ID_FIELD, id);
        for (key, value) in Equipment::from_document(document)?.fields {
            record.fields.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> Result<(), StoreError> {
        let mut records = self.enter()?;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.enter().map(|_| ())
    }
}

pub fn test_config() -> EquipmentConfig {
    EquipmentConfig {
        common: CoreConfig::default(),
        mongodb: MongoConfig {
            uri: Secret::new("mongodb://localhost:27017".to_string()),
            database: "EquiSports_test".to_string(),
            collection: "equipment".to_string(),
            ensure_indexes: false,
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_store(MemoryStore::default())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let state = AppState {
            config: test_config(),
            store: store.clone(),
        };
        Self {
            router: router(state),
            store,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Creates a record and returns its generated identifier.
    pub async fn create(&self, body: Value) -> String {
        let response = self.post("/add-equipment", body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.json()["data"]["insertedId"]
            .as_str()
            .expect("insertedId missing")
            .to_string()
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).expect("Failed to parse JSON")
    }
}
