mod get_product;
mod list_products;

pub use get_product::*;
pub use list_products::*;
