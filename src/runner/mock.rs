//! 测试用运行后端
//!
//! 默认回显输入；可配置固定回复、失败、人为延迟（用于超时路径测试）
//! 与单次直接工具调用（走请求携带的执行器），并记录收到的请求供断言。

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{ToolCallRecord, ToolOutputRecord};
use crate::runner::{AgentRunner, RunnerOutput, RunnerRequest};

#[derive(Default)]
pub struct MockRunner {
    reply: Option<String>,
    fail_with: Option<String>,
    delay: Option<Duration>,
    /// 运行中发起一次 (工具名, 参数) 的直接工具调用
    tool_call: Option<(String, Value)>,
    requests: Mutex<Vec<RunnerRequest>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 固定回复（不设置时回显输入）
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    pub fn with_failure(mut self, error: impl Into<String>) -> Self {
        self.fail_with = Some(error.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 运行时调用一次指定的直接工具
    pub fn with_tool_call(mut self, name: impl Into<String>, args: Value) -> Self {
        self.tool_call = Some((name.into(), args));
        self
    }

    /// 收到的全部请求（按顺序）
    pub fn requests(&self) -> Vec<RunnerRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentRunner for MockRunner {
    async fn run(&self, request: RunnerRequest) -> Result<RunnerOutput, String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut tool_calls = Vec::new();
        let mut tool_outputs = Vec::new();
        if let Some((name, args)) = &self.tool_call {
            let output = request.tools.execute(name, &request.ctx, args.clone()).await;
            tool_calls.push(ToolCallRecord {
                tool_name: name.clone(),
                args: args.clone(),
            });
            tool_outputs.push(ToolOutputRecord {
                tool_name: name.clone(),
                content: match output {
                    Ok(text) => Value::String(text),
                    Err(e) => Value::String(e),
                },
            });
        }

        let input = request.input.clone();
        self.requests.lock().unwrap().push(request);

        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }

        let text = match &self.reply {
            Some(reply) => reply.clone(),
            None => format!("Echo: {input}"),
        };
        Ok(RunnerOutput {
            text,
            tool_calls,
            tool_outputs,
        })
    }
}
