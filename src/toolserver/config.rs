//! 工具服务配置
//!
//! 从 JSON 文件加载各工具服务的启动命令、参数、端口与启用的工具名列表。
//! 配置缺失是可恢复状态：告警并返回空配置（工具服务不可用，不算硬错误）。

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// 单个工具服务的启动规格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSpec {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// 服务监听端口，未配置时用默认端口
    #[serde(default = "default_port")]
    pub port: u16,
}

pub(crate) fn default_port() -> u16 {
    8931
}

/// 工具服务配置文件根：服务规格 + 启用的工具名
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolServerConfig {
    #[serde(default)]
    pub servers: BTreeMap<String, ServerSpec>,
    #[serde(default)]
    pub enabled_tools: Vec<String>,
}

impl ToolServerConfig {
    /// 从 JSON 文件加载；文件不存在或格式错误时降级为空配置并告警
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "tool server config parse failed, using empty config");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "tool server config missing, external tools unavailable");
                Self::default()
            }
        }
    }

    pub fn server(&self, name: &str) -> Option<&ServerSpec> {
        self.servers.get(name)
    }
}
