//! # 领域服务
//!
//! 配置项、反馈、客户端日志三类资源的业务规则：
//! 必填字段校验、分页参数规整、重复检测、部分更新合并、统计区间解析。
//!
//! 服务只依赖 `client-manager-core` 中的仓储接口。配置项服务拿到的仓储
//! 通常是基础设施层的缓存装饰实现，但服务本身不感知缓存。

pub mod services;

pub use services::*;
