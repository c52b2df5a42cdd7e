pub mod equipment;

pub use equipment::{Equipment, EquipmentFields, InsertAcknowledgement, InsertResponse, MessageResponse};
