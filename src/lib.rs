//! Hive - Agent 运行时支撑层
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 共享类型（错误、执行上下文、响应）
//! - **db**: 记忆持久化（仓库接口、内存 / SQLite 实现、运行计数器）
//! - **memory**: 作用域记忆存储、默认值策略、消息历史
//! - **template**: 提示模板的变量提取与解析填充
//! - **toolserver**: 外部工具服务进程管理与 schema 目录
//! - **tools**: 进程内工具（记忆读写）与执行器
//! - **runner**: 运行后端抽象（含测试用 Mock）
//! - **orchestrator**: 单次运行的编排

pub mod config;
pub mod core;
pub mod db;
pub mod memory;
pub mod observability;
pub mod orchestrator;
pub mod runner;
pub mod template;
pub mod tools;
pub mod toolserver;

pub use crate::core::{AgentError, AgentResponse, ExecutionContext};
pub use orchestrator::{RunOrchestrator, RunRequest};
