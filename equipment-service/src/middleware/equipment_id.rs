use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

/// Identifier taken from the `:id` path segment.
///
/// Rejects anything that is not a 24 character hex ObjectId before the
/// handler runs, so malformed identifiers never reach the store.
#[derive(Debug, Clone, Copy)]
pub struct EquipmentId(pub ObjectId);

#[async_trait]
impl<S> FromRequestParts<S> for EquipmentId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("Invalid equipment ID format"))?;

        let id = ObjectId::parse_str(&raw).map_err(|_| {
            tracing::debug!(equipment_id = %raw, "Rejected malformed equipment id");
            AppError::bad_request("Invalid equipment ID format")
        })?;

        Ok(EquipmentId(id))
    }
}
