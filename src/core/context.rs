//! 执行上下文
//!
//! (agent_id, user_id, session_id) 三元组显式贯穿每次调用，
//! 取代按需拼装的占位上下文对象；agent_id 必填，其余为作用域通配。

use serde::{Deserialize, Serialize};

/// 一次 Agent 调用的作用域上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub agent_id: i64,
    /// 为 None 时表示用户级通配（全局作用域）
    pub user_id: Option<i64>,
    /// 为 None 时表示会话级通配
    pub session_id: Option<String>,
}

impl ExecutionContext {
    pub fn new(agent_id: i64) -> Self {
        Self {
            agent_id,
            user_id: None,
            session_id: None,
        }
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}
