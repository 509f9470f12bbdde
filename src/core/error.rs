//! Agent 运行时错误类型
//!
//! 记忆仓库、模板解析、外部进程与上游运行的全部可预见失败都收敛到 AgentError；
//! 除配置级不可恢复错误外，编排器一律转为降级响应而不上抛。

use thiserror::Error;

/// 运行时支撑层的错误（仓库访问、命名冲突、进程启动、上游运行等）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Memory not found: {0}")]
    NotFound(String),

    /// 同一作用域内的重名创建 / 改名冲突
    #[error("Memory name conflict: {0}")]
    Conflict(String),

    #[error("Data access error: {0}")]
    DataAccess(String),

    #[error("Tool server spawn failed: {0}")]
    SpawnError(String),

    #[error("Tool server error: {0}")]
    ProcessError(String),

    /// 上游 LLM 运行失败（provider 错误等），编排器转为非成功响应
    #[error("Upstream run failed: {0}")]
    UpstreamRun(String),

    /// 上游运行超时，与一般失败区分以便调用方识别
    #[error("Upstream run timed out after {0}s")]
    UpstreamTimeout(u64),

    /// 未指定 agent_id 时的显式错误（不做「第一个可用 agent」回退）
    #[error("No agent selected")]
    NoAgentSelected,

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl AgentError {
    /// 是否属于可降级错误：编排器遇到时继续产出响应而非中断
    pub fn is_degradable(&self) -> bool {
        !matches!(self, AgentError::NoAgentSelected | AgentError::ConfigError(_))
    }
}
