mod create_product;
mod delete_product;
mod toggle_product_active;
mod update_product;

pub use create_product::*;
pub use delete_product::*;
pub use toggle_product_active::*;
pub use update_product::*;
