//! 服务配置管理
//!
//! 配置按以下顺序叠加，后者覆盖前者：
//!
//! 1. 内置默认值
//! 2. TOML 配置文件（`--config` 指定，或默认路径）
//! 3. 以 `CLIENT_MANAGER_` 为前缀的环境变量，层级之间使用 `__` 分隔，
//!    例如 `CLIENT_MANAGER_DATABASE__URL`、`CLIENT_MANAGER_REDIS__ENABLED`
//!
//! 命令行参数（`--listen`、`--no-redis`）在加载完成后由启动代码覆盖。

pub mod models;

pub use models::*;
