use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use serde::Serialize;
use serde_json::{Map, Value};

/// Field name MongoDB reserves for the record identifier.
pub const ID_FIELD: &str = "_id";

/// Field used to filter equipment by owner.
pub const OWNER_EMAIL_FIELD: &str = "userEmail";

/// Client supplied attributes of an equipment record. No schema is enforced
/// beyond "this is a JSON object".
pub type EquipmentFields = Map<String, Value>;

/// A stored equipment record: the store-assigned identifier plus whatever
/// fields the client submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equipment {
    #[serde(
        rename = "_id",
        serialize_with = "bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    #[serde(flatten)]
    pub fields: EquipmentFields,
}

impl Equipment {
    /// Builds a record from a raw BSON document read from the collection.
    pub fn from_document(mut document: Document) -> anyhow::Result<Self> {
        let id = match document.remove(ID_FIELD) {
            Some(Bson::ObjectId(id)) => id,
            Some(other) => anyhow::bail!("unexpected identifier type: {:?}", other.element_type()),
            None => anyhow::bail!("document has no identifier"),
        };

        let fields = document
            .into_iter()
            .map(|(key, value)| (key, value.into_relaxed_extjson()))
            .collect();

        Ok(Self { id, fields })
    }
}

/// Drops any client supplied identifier. The identifier is owned by the store
/// and never changes after insertion.
pub fn without_identifier(mut fields: EquipmentFields) -> EquipmentFields {
    fields.remove(ID_FIELD);
    fields
}

/// Converts client fields into a BSON document suitable for `insertOne` or `$set`.
///
/// BSON has no unsigned 64-bit type, so integers above `i64::MAX` are stored
/// as doubles.
pub fn fields_to_document(fields: &EquipmentFields) -> anyhow::Result<Document> {
    let fields: EquipmentFields = fields
        .iter()
        .map(|(key, value)| (key.clone(), widen_unsigned(value)))
        .collect();
    Ok(bson::to_document(&fields)?)
}

fn widen_unsigned(value: &Value) -> Value {
    match value {
        Value::Number(number) => match number.as_u64() {
            Some(n) if n > i64::MAX as u64 => Value::from(n as f64),
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(widen_unsigned).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), widen_unsigned(value)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAcknowledgement {
    pub acknowledged: bool,
    #[serde(serialize_with = "bson::serde_helpers::serialize_object_id_as_hex_string")]
    pub inserted_id: ObjectId,
}

#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub message: &'static str,
    pub data: InsertAcknowledgement,
}

impl InsertResponse {
    pub fn new(inserted_id: ObjectId) -> Self {
        Self {
            message: "Equipment added successfully!",
            data: InsertAcknowledgement {
                acknowledged: true,
                inserted_id,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
