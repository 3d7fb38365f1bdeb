use std::sync::Arc;

use client_manager_core::{
    EvaluationType, Feedback, FeedbackRepository, FeedbackRequest, FeedbackStats, FeedbackType,
    ManagerError, ManagerResult, Page, PageRequest,
};
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use super::validation::{parse_date_range, require};

pub struct FeedbackService {
    repository: Arc<dyn FeedbackRepository>,
}

impl FeedbackService {
    pub fn new(repository: Arc<dyn FeedbackRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, request))]
    pub async fn create_completion(&self, request: FeedbackRequest) -> ManagerResult<Feedback> {
        let feedback = Self::build_common(FeedbackType::Completion, &request)?;
        self.store(feedback).await
    }

    /// 批量导入补全反馈
    ///
    /// 无效条目（缺少 conversation_id）被跳过并记录告警；
    /// 全部无效时返回验证错误。返回实际写入条数。
    #[instrument(skip(self, requests), fields(submitted = requests.len()))]
    pub async fn create_completions_batch(&self, requests: Vec<FeedbackRequest>) -> ManagerResult<usize> {
        let submitted = requests.len();
        let feedbacks: Vec<Feedback> = requests
            .iter()
            .enumerate()
            .filter_map(|(index, request)| match Self::build_common(FeedbackType::Completion, request) {
                Ok(feedback) => Some(feedback),
                Err(e) => {
                    warn!("批量反馈第 {} 条无效，已跳过: {}", index, e);
                    None
                }
            })
            .collect();

        if feedbacks.is_empty() {
            return Err(ManagerError::validation("data", "no valid feedback data provided"));
        }

        let created = self.repository.create_batch(&feedbacks).await?;
        info!("批量补全反馈写入成功: {}/{}", created, submitted);
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn create_copy_code(&self, request: FeedbackRequest) -> ManagerResult<Feedback> {
        let feedback = Self::build_common(FeedbackType::CopyCode, &request)?;
        self.store(feedback).await
    }

    /// 点赞/点踩，内容即评价类型
    #[instrument(skip(self, request))]
    pub async fn create_evaluate(&self, request: FeedbackRequest) -> ManagerResult<Feedback> {
        let mut feedback = Self::build_common(FeedbackType::Evaluate, &request)?;
        let evaluation: EvaluationType = require("evaluation_type", request.evaluation_type.as_deref())?
            .parse()
            .map_err(|msg: String| ManagerError::validation("evaluation_type", msg))?;

        feedback.content = evaluation.as_str().to_string();
        self.store(feedback).await
    }

    /// 使用代码，内容即动作类型
    #[instrument(skip(self, request))]
    pub async fn create_use_code(&self, request: FeedbackRequest) -> ManagerResult<Feedback> {
        let mut feedback = Self::build_common(FeedbackType::UseCode, &request)?;
        feedback.content = require("action_type", request.action_type.as_deref())?.to_string();
        self.store(feedback).await
    }

    /// 问题反馈，`issue_type` 并入 JSON 元数据
    #[instrument(skip(self, request))]
    pub async fn create_issue(&self, request: FeedbackRequest) -> ManagerResult<Feedback> {
        let description = require("description", request.description.as_deref())?;

        let mut feedback = Feedback::new(FeedbackType::Issue);
        feedback.conversation_id = request.conversation_id.clone().unwrap_or_default();
        feedback.user_id = request.user_id.clone().unwrap_or_default();
        feedback.content = description.to_string();
        feedback.metadata = merge_issue_type(
            request.metadata.as_deref().unwrap_or_default(),
            request.issue_type.as_deref().unwrap_or_default(),
        )?;

        self.store(feedback).await
    }

    #[instrument(skip(self, request))]
    pub async fn create_error(&self, request: FeedbackRequest) -> ManagerResult<Feedback> {
        let mut feedback = Feedback::new(FeedbackType::Error);
        feedback.conversation_id = request.conversation_id.unwrap_or_default();
        feedback.user_id = request.user_id.unwrap_or_default();
        feedback.content = request.content.unwrap_or_default();
        feedback.metadata = request.metadata.unwrap_or_default();
        self.store(feedback).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_conversation(&self, conversation_id: &str) -> ManagerResult<Vec<Feedback>> {
        require("conversation_id", Some(conversation_id))?;
        self.repository.list_by_conversation(conversation_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_type(&self, feedback_type: &str, page: PageRequest) -> ManagerResult<Page<Feedback>> {
        let feedback_type: FeedbackType = require("type", Some(feedback_type))?
            .parse()
            .map_err(|msg: String| ManagerError::validation("type", msg))?;
        let page = page.normalized();

        let total = self.repository.count_by_type(feedback_type).await?;
        let items = self.repository.list_by_type(feedback_type, page).await?;
        Ok(Page::new(items, total, page))
    }

    #[instrument(skip(self))]
    pub async fn get_stats(&self, start_date: Option<&str>, end_date: Option<&str>) -> ManagerResult<FeedbackStats> {
        let (start, end) = parse_date_range(start_date, end_date)?;
        self.repository.stats(start, end).await
    }

    async fn store(&self, feedback: Feedback) -> ManagerResult<Feedback> {
        let created = self.repository.create(&feedback).await?;
        info!(
            feedback_type = %created.feedback_type,
            conversation_id = %created.conversation_id,
            "反馈创建成功"
        );
        Ok(created)
    }

    /// 补全、复制代码、点赞、使用代码共用的字段，conversation_id 必填
    fn build_common(feedback_type: FeedbackType, request: &FeedbackRequest) -> ManagerResult<Feedback> {
        let conversation_id = require("conversation_id", request.conversation_id.as_deref())?;

        let mut feedback = Feedback::new(feedback_type);
        feedback.conversation_id = conversation_id.to_string();
        feedback.user_id = request.user_id.clone().unwrap_or_default();
        feedback.content = request.content.clone().unwrap_or_default();
        feedback.metadata = request.metadata.clone().unwrap_or_default();
        Ok(feedback)
    }
}

/// 将 issue_type 合并进元数据 JSON 对象；issue_type 为空时原样保留
fn merge_issue_type(metadata: &str, issue_type: &str) -> ManagerResult<String> {
    if issue_type.is_empty() {
        return Ok(metadata.to_string());
    }

    let mut object = if metadata.trim().is_empty() {
        Map::new()
    } else {
        match serde_json::from_str::<Value>(metadata) {
            Ok(Value::Object(map)) => map,
            _ => return Err(ManagerError::validation("metadata", "metadata 必须是JSON对象")),
        }
    };

    object.insert("issue_type".to_string(), Value::String(issue_type.to_string()));
    Ok(Value::Object(object).to_string())
}
