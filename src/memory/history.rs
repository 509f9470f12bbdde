//! 消息历史
//!
//! 一次会话内的有序消息记录：系统提示、用户输入、助手回复（含工具调用记录）。
//! 编排器在运行成功后把助手输出写入此处。

use serde::{Deserialize, Serialize};

use crate::core::{ToolCallRecord, ToolOutputRecord};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 消息历史：保留最近 max_turns 轮（user + assistant 各一条算一轮）
#[derive(Clone, Debug, Default)]
pub struct MessageHistory {
    messages: Vec<Message>,
    max_turns: usize,
    /// 成功运行产生的工具调用记录，随助手回复一并追加
    tool_calls: Vec<ToolCallRecord>,
    tool_outputs: Vec<ToolOutputRecord>,
}

impl MessageHistory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_turns,
            tool_calls: Vec::new(),
            tool_outputs: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        &self.tool_calls
    }

    pub fn tool_outputs(&self) -> &[ToolOutputRecord] {
        &self.tool_outputs
    }

    /// 记录本轮实际使用的系统提示（填充后的模板）
    pub fn add_system_prompt(&mut self, prompt: impl Into<String>) {
        self.messages.push(Message::system(prompt));
    }

    pub fn add_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
        self.prune();
    }

    /// 追加助手回复与本轮工具调用记录
    pub fn add_response(
        &mut self,
        content: impl Into<String>,
        tool_calls: Vec<ToolCallRecord>,
        tool_outputs: Vec<ToolOutputRecord>,
    ) {
        self.messages.push(Message::assistant(content));
        self.tool_calls.extend(tool_calls);
        self.tool_outputs.extend(tool_outputs);
        self.prune();
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.tool_calls.clear();
        self.tool_outputs.clear();
    }

    /// 超出 max_turns*2 条非系统消息时丢弃最旧的（系统提示保留）
    fn prune(&mut self) {
        if self.max_turns == 0 {
            return;
        }
        let cap = self.max_turns * 2;
        let non_system = self
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .count();
        if non_system > cap {
            let mut to_drop = non_system - cap;
            self.messages.retain(|m| {
                if m.role != Role::System && to_drop > 0 {
                    to_drop -= 1;
                    false
                } else {
                    true
                }
            });
        }
    }
}
