//! Agent 运行后端
//!
//! 协调器通过 AgentRunner trait 调用实际的推理后端；
//! 后端收到的是已填充的系统提示词、用户输入、历史与完整工具集，
//! 不关心模板解析与进程管理。MockRunner 供测试使用。

pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::{ExecutionContext, ToolCallRecord, ToolOutputRecord};
use crate::memory::history::Message;
use crate::tools::ToolExecutor;

pub use mock::MockRunner;

/// 单次运行的输入：全部上下文显式给出
#[derive(Clone)]
pub struct RunnerRequest {
    /// 作用域上下文，随请求传给每次直接工具调用
    pub ctx: ExecutionContext,
    pub system_prompt: String,
    pub input: String,
    pub history: Vec<Message>,
    /// 工具名 -> {description, parameters}，进程内与外部工具合并后的完整集合
    pub tool_schemas: Map<String, Value>,
    /// 进程内工具的执行入口（超时与审计已包好）
    pub tools: Arc<ToolExecutor>,
    /// 外部工具服务端点 URL（名称 -> URL）
    pub external_servers: Vec<(String, String)>,
}

/// 单次运行的输出
#[derive(Debug, Clone)]
pub struct RunnerOutput {
    pub text: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub tool_outputs: Vec<ToolOutputRecord>,
}

/// 运行后端抽象；错误用字符串描述，由协调器统一包装
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, request: RunnerRequest) -> Result<RunnerOutput, String>;
}
