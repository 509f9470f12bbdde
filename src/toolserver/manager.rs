//! 工具服务进程管理器
//!
//! 每种工具服务一个进程级单例，供全部并发运行共享：
//! start 拉起子进程并记录端点 URL（已运行时直接返回缓存 URL），
//! stop 先请求优雅退出、限时等待后强杀；start/stop 状态迁移互斥。

use std::process::Stdio;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use crate::core::AgentError;
use crate::toolserver::config::{ServerSpec, ToolServerConfig};
use crate::toolserver::schemas::schemas_for;

/// 优雅退出的等待上限（秒），超过后强杀
const STOP_GRACE_SECS: u64 = 5;

/// 进程状态机：Stopped -> Starting -> Running -> Stopping -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

struct ProcessInner {
    state: ProcessState,
    child: Option<Child>,
    endpoint: Option<String>,
}

/// 工具服务管理器：名称 + 启动规格 + 启用工具；内部状态单锁保护
pub struct ToolServerManager {
    name: String,
    spec: Option<ServerSpec>,
    enabled_tools: Vec<String>,
    inner: Mutex<ProcessInner>,
}

impl ToolServerManager {
    /// 从配置构建指定名称的管理器；规格缺失时仍可创建（start 时报 SpawnError）
    pub fn from_config(name: impl Into<String>, config: &ToolServerConfig) -> Self {
        let name = name.into();
        Self {
            spec: config.server(&name).cloned(),
            enabled_tools: config.enabled_tools.clone(),
            name,
            inner: Mutex::new(ProcessInner {
                state: ProcessState::Stopped,
                child: None,
                endpoint: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 启动服务并返回端点 URL；已运行时不重新拉起，直接返回缓存 URL。
    /// 启动失败时状态回落 Stopped。
    pub async fn start(&self) -> Result<String, AgentError> {
        let mut inner = self.inner.lock().await;

        if inner.state == ProcessState::Running {
            if let Some(url) = &inner.endpoint {
                return Ok(url.clone());
            }
        }

        let spec = self.spec.as_ref().ok_or_else(|| {
            AgentError::SpawnError(format!("no launch spec configured for '{}'", self.name))
        })?;

        inner.state = ProcessState::Starting;

        let mut cmd = Command::new(&spec.command);
        cmd.args(&spec.args);
        // 端口未在 args 中显式给出时补上，保证端点可预测
        if !spec.args.iter().any(|a| a == "--port") {
            cmd.arg("--port").arg(spec.port.to_string());
        }
        // stdout/stderr 仅捕获用于诊断，不参与控制流
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                inner.state = ProcessState::Stopped;
                return Err(AgentError::SpawnError(format!(
                    "failed to launch '{}': {e}",
                    self.name
                )));
            }
        };

        let url = format!("http://localhost:{}/sse", spec.port);
        tracing::info!(
            server = %self.name,
            pid = child.id(),
            url = %url,
            "tool server started"
        );

        inner.child = Some(child);
        inner.endpoint = Some(url.clone());
        inner.state = ProcessState::Running;
        Ok(url)
    }

    /// 停止服务：优雅请求 -> 限时等待 -> 强杀。
    /// 已停止时为幂等成功；仅在无法确认进程结束时返回 false。
    pub async fn stop(&self) -> bool {
        let mut inner = self.inner.lock().await;

        let Some(mut child) = inner.child.take() else {
            inner.state = ProcessState::Stopped;
            inner.endpoint = None;
            return true;
        };

        inner.state = ProcessState::Stopping;

        #[cfg(unix)]
        if let Some(pid) = child.id() {
            // SIGTERM 请求优雅退出；异步执行，不占用运行时线程
            let _ = Command::new("kill")
                .args(["-TERM", &pid.to_string()])
                .status()
                .await;
        }

        let ended = match tokio::time::timeout(
            Duration::from_secs(STOP_GRACE_SECS),
            child.wait(),
        )
        .await
        {
            Ok(Ok(status)) => {
                tracing::info!(server = %self.name, ?status, "tool server exited");
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(server = %self.name, error = %e, "tool server wait failed");
                false
            }
            Err(_) => {
                tracing::warn!(server = %self.name, "graceful stop timed out, killing");
                match child.kill().await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::error!(server = %self.name, error = %e, "force kill failed");
                        false
                    }
                }
            }
        };

        inner.state = ProcessState::Stopped;
        inner.endpoint = None;
        ended
    }

    /// 最近一次发现的端点；未启动或已停止时为 None
    pub async fn endpoint(&self) -> Option<String> {
        self.inner.lock().await.endpoint.clone()
    }

    pub async fn state(&self) -> ProcessState {
        self.inner.lock().await.state
    }

    /// 启用工具的 schema 映射：静态元数据，不要求进程在运行
    pub fn tool_schemas(&self) -> Map<String, Value> {
        schemas_for(&self.enabled_tools)
    }
}
