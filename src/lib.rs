//! 客户端遥测管理服务的进程装配：应用启动与优雅关闭。

pub mod app;
pub mod shutdown;
