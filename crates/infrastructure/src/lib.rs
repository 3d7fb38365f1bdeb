//! 基础设施层
//!
//! - `database`: SQLite / PostgreSQL 仓储实现与连接池管理
//! - `cache`: Redis 缓存与配置项的缓存装饰仓储
//! - `error_handling`: 仓储错误的上下文转换

pub mod cache;
pub mod database;
pub mod error_handling;

pub use cache::*;
pub use database::*;
pub use error_handling::{RepositoryErrorHelpers, RepositoryOperation};
