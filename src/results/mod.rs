mod merger;
pub mod models;

pub use models::*;
