use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 批量写入时每条 INSERT 语句携带的记录数
pub const FEEDBACK_BATCH_SIZE: usize = 100;

/// 反馈类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Completion,
    CopyCode,
    Evaluate,
    UseCode,
    Issue,
    Error,
}

impl FeedbackType {
    pub const ALL: [FeedbackType; 6] = [
        FeedbackType::Completion,
        FeedbackType::CopyCode,
        FeedbackType::Evaluate,
        FeedbackType::UseCode,
        FeedbackType::Issue,
        FeedbackType::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Completion => "completion",
            FeedbackType::CopyCode => "copy_code",
            FeedbackType::Evaluate => "evaluate",
            FeedbackType::UseCode => "use_code",
            FeedbackType::Issue => "issue",
            FeedbackType::Error => "error",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedbackType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("无效的反馈类型: {s}"))
    }
}

/// 点赞/点踩
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationType {
    Like,
    Dislike,
}

impl EvaluationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationType::Like => "like",
            EvaluationType::Dislike => "dislike",
        }
    }
}

impl FromStr for EvaluationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(EvaluationType::Like),
            "dislike" => Ok(EvaluationType::Dislike),
            _ => Err(format!("evaluation_type 必须是 like 或 dislike: {s}")),
        }
    }
}

/// 用户反馈记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub conversation_id: String,
    pub user_id: String,
    pub content: String,
    pub metadata: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(feedback_type: FeedbackType) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            feedback_type,
            conversation_id: String::new(),
            user_id: String::new(),
            content: String::new(),
            metadata: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// 反馈提交请求
///
/// 各类反馈共用一个结构，不同类型使用不同的字段子集：
/// `evaluate` 需要 `evaluation_type`，`use_code` 需要 `action_type`，
/// `issue` 需要 `description` 并可携带 `issue_type`。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub conversation_id: Option<String>,
    pub user_id: Option<String>,
    pub content: Option<String>,
    pub metadata: Option<String>,
    pub evaluation_type: Option<String>,
    pub action_type: Option<String>,
    pub description: Option<String>,
    pub issue_type: Option<String>,
}

/// 反馈统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub type_counts: HashMap<String, i64>,
    pub total_count: i64,
}
