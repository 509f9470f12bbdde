//! 运行编排器
//!
//! 单次 agent 运行的完整序列：校验 agent 选择、确保工具服务就绪、
//! 解析系统提示模板、合并工具集、限时调用运行后端、落历史。
//! 上游失败与超时转换为 success=false 的响应返回，不向调用方抛错；
//! 工具服务启动失败仅降级（该服务的工具本轮不可用）。

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::core::{AgentError, AgentResponse, ExecutionContext};
use crate::memory::history::MessageHistory;
use crate::runner::{AgentRunner, RunnerRequest};
use crate::template::{ResolvedTemplate, TemplateResolver};
use crate::tools::ToolExecutor;
use crate::toolserver::ToolServerManager;

/// 运行后端的默认超时（秒）
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;

/// 一次运行的请求；agent 未选择是硬错误而非隐式回退
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub agent_id: Option<i64>,
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    /// 含 {{variable}} 占位符的系统提示模板
    pub template: String,
    pub input: String,
    /// 为 false 时跳过外部工具服务（不拉起进程，不合并其 schema）
    pub use_external_tools: bool,
    /// 取消令牌：触发后本次运行以失败响应返回（调用方的「停止生成」）
    pub cancel: Option<CancellationToken>,
}

pub struct RunOrchestrator {
    resolver: TemplateResolver,
    runner: Arc<dyn AgentRunner>,
    tools: Arc<ToolExecutor>,
    tool_servers: Vec<Arc<ToolServerManager>>,
    run_timeout: Duration,
}

impl RunOrchestrator {
    pub fn new(
        resolver: TemplateResolver,
        runner: Arc<dyn AgentRunner>,
        tools: Arc<ToolExecutor>,
        tool_servers: Vec<Arc<ToolServerManager>>,
    ) -> Self {
        Self {
            resolver,
            runner,
            tools,
            tool_servers,
            run_timeout: Duration::from_secs(DEFAULT_RUN_TIMEOUT_SECS),
        }
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// 执行一次运行；history 记录本轮系统提示、用户输入与助手回复
    pub async fn run_agent(
        &self,
        request: RunRequest,
        history: &mut MessageHistory,
    ) -> AgentResponse {
        let Some(agent_id) = request.agent_id else {
            tracing::error!("run requested without an agent selected");
            return AgentResponse::failure(AgentError::NoAgentSelected.to_string());
        };

        let mut ctx = ExecutionContext::new(agent_id);
        if let Some(user_id) = request.user_id {
            ctx = ctx.with_user(user_id);
        }
        if let Some(session_id) = &request.session_id {
            ctx = ctx.with_session(session_id.clone());
        }

        // 工具服务：启动失败只降级，该服务的工具本轮不参与
        let external_servers = if request.use_external_tools {
            self.ensure_tool_servers().await
        } else {
            Vec::new()
        };

        let ResolvedTemplate { text: system_prompt, degraded } =
            self.resolver.resolve(&request.template, &ctx).await;

        let mut tool_schemas: Map<String, Value> = self.tools.registry().to_schemas();
        for (manager, _) in &external_servers {
            tool_schemas.extend(manager.tool_schemas());
        }

        history.add_system_prompt(system_prompt.clone());
        history.add_user(request.input.clone());

        let runner_request = RunnerRequest {
            ctx: ctx.clone(),
            system_prompt,
            input: request.input,
            history: history.messages().to_vec(),
            tool_schemas,
            tools: Arc::clone(&self.tools),
            external_servers: external_servers
                .iter()
                .map(|(m, url)| (m.name().to_string(), url.clone()))
                .collect(),
        };

        let run = tokio::time::timeout(self.run_timeout, self.runner.run(runner_request));
        let outcome = match &request.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!(agent_id, "agent run cancelled");
                    return AgentResponse::failure("Run cancelled");
                }
                outcome = run => outcome,
            },
            None => run.await,
        };

        match outcome {
            Ok(Ok(output)) => {
                history.add_response(
                    output.text.clone(),
                    output.tool_calls.clone(),
                    output.tool_outputs.clone(),
                );
                AgentResponse {
                    text: output.text,
                    success: true,
                    tool_calls: output.tool_calls,
                    tool_outputs: output.tool_outputs,
                    error_message: None,
                    degraded_variables: degraded,
                }
            }
            Ok(Err(e)) => {
                tracing::error!(agent_id, error = %e, "agent run failed");
                AgentResponse::failure(AgentError::UpstreamRun(e).to_string())
            }
            Err(_) => {
                tracing::error!(
                    agent_id,
                    timeout_secs = self.run_timeout.as_secs(),
                    "agent run timed out"
                );
                AgentResponse::failure(
                    AgentError::UpstreamTimeout(self.run_timeout.as_secs()).to_string(),
                )
            }
        }
    }

    /// 启动全部已配置的工具服务，返回就绪的 (管理器, 端点) 列表
    async fn ensure_tool_servers(&self) -> Vec<(Arc<ToolServerManager>, String)> {
        let mut ready = Vec::with_capacity(self.tool_servers.len());
        for manager in &self.tool_servers {
            match manager.start().await {
                Ok(url) => ready.push((Arc::clone(manager), url)),
                Err(e) => {
                    tracing::warn!(server = %manager.name(), error = %e, "tool server unavailable, continuing without it");
                }
            }
        }
        ready
    }

    /// 停掉全部工具服务（进程退出前调用）
    pub async fn shutdown(&self) {
        for manager in &self.tool_servers {
            if !manager.stop().await {
                tracing::warn!(server = %manager.name(), "tool server did not stop cleanly");
            }
        }
    }
}
