pub mod equipment_id;

pub use equipment_id::EquipmentId;
