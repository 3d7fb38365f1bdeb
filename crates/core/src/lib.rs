pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod traits;

pub use config::*;
pub use errors::{ManagerError, ManagerResult};
pub use metrics::{CounterSnapshot, RequestCounters};
pub use models::*;
pub use traits::*;
