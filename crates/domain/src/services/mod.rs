pub mod configuration_service;
pub mod feedback_service;
pub mod log_service;
pub mod validation;

pub use configuration_service::ConfigurationService;
pub use feedback_service::FeedbackService;
pub use log_service::LogService;
