pub mod cache;
pub mod repository;

pub use cache::*;
pub use repository::*;
