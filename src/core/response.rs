//! Agent 响应结构
//!
//! 编排器对外的统一返回：文本 + 成功标志 + 工具调用记录；
//! 上游失败被转换为 success=false 的响应而非错误上抛。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 一次工具调用的记录（名称 + 参数）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub args: Value,
}

/// 一次工具调用的输出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutputRecord {
    pub tool_name: String,
    pub content: Value,
}

/// 编排器返回给调用方的响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub text: String,
    pub success: bool,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    #[serde(default)]
    pub tool_outputs: Vec<ToolOutputRecord>,
    pub error_message: Option<String>,
    /// 本次解析中被降级（用回退默认值填充）的模板变量
    #[serde(default)]
    pub degraded_variables: Vec<String>,
}

impl AgentResponse {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
            tool_calls: Vec::new(),
            tool_outputs: Vec::new(),
            error_message: None,
            degraded_variables: Vec::new(),
        }
    }

    /// 失败响应：错误描述同时作为用户可见文本
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            text: format!("An error occurred while processing your request: {error}"),
            success: false,
            tool_calls: Vec::new(),
            tool_outputs: Vec::new(),
            error_message: Some(error),
            degraded_variables: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_error_text() {
        let resp = AgentResponse::failure("provider unreachable");
        assert!(!resp.success);
        assert!(resp.text.contains("provider unreachable"));
        assert_eq!(resp.error_message.as_deref(), Some("provider unreachable"));
    }

    #[test]
    fn test_success_roundtrip_json() {
        let resp = AgentResponse::success("hello");
        let json = serde_json::to_string(&resp).unwrap();
        let back: AgentResponse = serde_json::from_str(&json).unwrap();
        assert!(back.success);
        assert_eq!(back.text, "hello");
    }
}
