//! # 数据模型
//!
//! 客户端管理服务的核心数据结构。
//!
//! ## 核心模型
//!
//! ### ConfigurationEntry - 配置项
//! 以 `(namespace, key)` 复合键标识的一条字符串配置，支持软删除。
//! 配置读取经过缓存旁路（cache-aside）加速，缓存中只保存 `value`。
//!
//! ### Feedback - 用户反馈
//! 补全、复制代码、点赞/点踩、使用代码、问题反馈、错误上报六类反馈。
//!
//! ### ClientLog - 客户端日志
//! 客户端上报的日志记录，按客户端、用户、模块检索。
//!
//! ### Page - 分页结果
//! 统一的分页结构，分页参数由 [`PageRequest::normalized`] 规整。
//!
//! ## 设计原则
//!
//! - 所有时间字段使用 `DateTime<Utc>`
//! - 枚举字段以字符串落库，读取时解析
//! - 请求结构的字段全部可选，必填校验在服务层完成，
//!   以便返回带字段名的验证错误

pub mod client_log;
pub mod configuration;
pub mod feedback;
pub mod pagination;

pub use client_log::*;
pub use configuration::*;
pub use feedback::*;
pub use pagination::*;
