pub mod equipment;
pub mod health;

pub use equipment::{
    add_equipment, delete_equipment, get_equipment, list_equipment, list_products,
    list_user_equipment, update_equipment,
};
pub use health::{health_check, metrics, root};
