//! 外部工具服务：配置加载、进程生命周期、工具 schema 目录

pub mod config;
pub mod manager;
pub mod schemas;

pub use config::{ServerSpec, ToolServerConfig};
pub use manager::{ProcessState, ToolServerManager};
pub use schemas::schemas_for;
