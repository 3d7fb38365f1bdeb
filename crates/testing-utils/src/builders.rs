//! Test data builders for creating test entities
//!
//! This module provides builder patterns for creating test data with
//! sensible defaults and easy customization.

use chrono::{DateTime, Utc};
use client_manager_core::{
    ClientLog, ConfigurationEntry, CreateConfigurationRequest, CreateLogRequest, Feedback, FeedbackRequest,
    FeedbackType,
};

/// Builder for persisted-looking ConfigurationEntry values
pub struct ConfigurationBuilder {
    entry: ConfigurationEntry,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            entry: ConfigurationEntry {
                id: 1,
                namespace: "build".to_string(),
                key: "timeout".to_string(),
                value: "30".to_string(),
                description: String::new(),
                created_at: Some(now),
                updated_at: Some(now),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.entry.id = id;
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.entry.namespace = namespace.to_string();
        self
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.entry.key = key.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.entry.value = value.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.entry.description = description.to_string();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.entry.created_at = Some(created_at);
        self.entry.updated_at = Some(created_at);
        self
    }

    pub fn build(self) -> ConfigurationEntry {
        self.entry
    }

    /// The matching create request
    pub fn build_request(self) -> CreateConfigurationRequest {
        CreateConfigurationRequest {
            namespace: Some(self.entry.namespace),
            key: Some(self.entry.key),
            value: Some(self.entry.value),
            description: Some(self.entry.description),
        }
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for Feedback records
pub struct FeedbackBuilder {
    feedback: Feedback,
}

impl FeedbackBuilder {
    pub fn new() -> Self {
        let mut feedback = Feedback::new(FeedbackType::Completion);
        feedback.conversation_id = "conv-1".to_string();
        feedback.user_id = "user-1".to_string();
        Self { feedback }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.feedback.id = id;
        self
    }

    pub fn with_type(mut self, feedback_type: FeedbackType) -> Self {
        self.feedback.feedback_type = feedback_type;
        self
    }

    pub fn with_conversation(mut self, conversation_id: &str) -> Self {
        self.feedback.conversation_id = conversation_id.to_string();
        self
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.feedback.user_id = user_id.to_string();
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.feedback.content = content.to_string();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.feedback.metadata = metadata.to_string();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.feedback.created_at = created_at;
        self.feedback.updated_at = created_at;
        self
    }

    pub fn build(self) -> Feedback {
        self.feedback
    }

    /// The matching submission request
    pub fn build_request(self) -> FeedbackRequest {
        FeedbackRequest {
            conversation_id: Some(self.feedback.conversation_id),
            user_id: Some(self.feedback.user_id),
            content: Some(self.feedback.content),
            metadata: Some(self.feedback.metadata),
            ..Default::default()
        }
    }
}

impl Default for FeedbackBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for ClientLog records
pub struct ClientLogBuilder {
    log: ClientLog,
}

impl ClientLogBuilder {
    pub fn new() -> Self {
        let mut log = ClientLog::new("client-1", "editor");
        log.user_id = "user-1".to_string();
        log.file_name = "main.log".to_string();
        log.log_content = "started".to_string();
        log.first_line_no = 1;
        log.end_line_no = 1;
        Self { log }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.log.id = id;
        self
    }

    pub fn with_client(mut self, client_id: &str) -> Self {
        self.log.client_id = client_id.to_string();
        self
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.log.user_id = user_id.to_string();
        self
    }

    pub fn with_module(mut self, module_name: &str) -> Self {
        self.log.module_name = module_name.to_string();
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.log.log_content = content.to_string();
        self
    }

    pub fn session_start(mut self) -> Self {
        self.log.start_flag = true;
        self
    }

    pub fn session_end(mut self) -> Self {
        self.log.end_flag = true;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.log.created_at = created_at;
        self.log.updated_at = created_at;
        self
    }

    pub fn build(self) -> ClientLog {
        self.log
    }

    pub fn build_request(self) -> CreateLogRequest {
        CreateLogRequest {
            client_id: Some(self.log.client_id),
            user_id: Some(self.log.user_id),
            module_name: Some(self.log.module_name),
            file_name: Some(self.log.file_name),
            log_content: Some(self.log.log_content),
            first_line_no: Some(self.log.first_line_no),
            end_line_no: Some(self.log.end_line_no),
            start_flag: self.log.start_flag,
            end_flag: self.log.end_flag,
        }
    }
}

impl Default for ClientLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
