//! 记忆条目数据模型
//!
//! MemoryEntry 以 (agent_id, user_id, session_id, name) 四元组唯一；
//! 同名条目可同时存在于不同作用域层级，解析时按最具体优先。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 读取模式：自动注入系统提示词，或仅在工具调用时取用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    SystemPrompt,
    ToolCalling,
}

impl ReadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadMode::SystemPrompt => "system_prompt",
            ReadMode::ToolCalling => "tool_calling",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system_prompt" => Some(ReadMode::SystemPrompt),
            "tool_calling" => Some(ReadMode::ToolCalling),
            _ => None,
        }
    }
}

/// 访问模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "read_only",
            AccessMode::ReadWrite => "read_write",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read_only" => Some(AccessMode::ReadOnly),
            "read_write" => Some(AccessMode::ReadWrite),
            _ => None,
        }
    }
}

/// 记忆作用域：agent 必填，user/session 为 None 表示该层级通配
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryScope {
    pub agent_id: i64,
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
}

impl MemoryScope {
    pub fn global(agent_id: i64) -> Self {
        Self {
            agent_id,
            user_id: None,
            session_id: None,
        }
    }

    pub fn user(agent_id: i64, user_id: i64) -> Self {
        Self {
            agent_id,
            user_id: Some(user_id),
            session_id: None,
        }
    }

    pub fn session(agent_id: i64, user_id: Option<i64>, session_id: impl Into<String>) -> Self {
        Self {
            agent_id,
            user_id,
            session_id: Some(session_id.into()),
        }
    }
}

/// 记忆条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub description: Option<String>,
    pub read_mode: ReadMode,
    pub access: AccessMode,
    pub scope: MemoryScope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建记忆的字段集合（id / 时间戳由仓库赋值）
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub name: String,
    pub content: String,
    pub description: Option<String>,
    pub read_mode: ReadMode,
    pub access: AccessMode,
    pub scope: MemoryScope,
}

/// 部分更新：None 表示保持原值
#[derive(Debug, Clone, Default)]
pub struct MemoryUpdate {
    pub content: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
}

/// Agent 记录：run_id 即运行计数器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: i64,
    pub name: String,
    pub run_id: i64,
}

/// 结构化内容入库前统一序列化为字符串
pub fn normalize_content(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
