//! 工具执行器
//!
//! 在注册表之上加一层执行策略：单次调用超时上限、
//! 调用与结果的结构化审计日志。失败以字符串返回给调用方，
//! 由上层决定是否将错误文本回传给 LLM 继续对话。

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::core::ExecutionContext;
use crate::tools::registry::ToolRegistry;

/// 单次工具调用的默认超时（秒）
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    /// 执行单次工具调用；超时计为失败而非挂起
    pub async fn execute(
        &self,
        name: &str,
        ctx: &ExecutionContext,
        args: Value,
    ) -> Result<String, String> {
        tracing::info!(
            tool = %name,
            agent_id = ctx.agent_id,
            args = %args,
            "executing tool"
        );

        let result = tokio::time::timeout(self.timeout, self.registry.execute(name, ctx, args))
            .await
            .unwrap_or_else(|_| {
                Err(format!(
                    "Tool '{name}' timed out after {}s",
                    self.timeout.as_secs()
                ))
            });

        match &result {
            Ok(output) => {
                tracing::info!(tool = %name, output_len = output.len(), "tool call succeeded");
            }
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool call failed");
            }
        }
        result
    }
}
