//! 记忆仓库接口
//!
//! 存储引擎作为外部协作方，通过窄接口消费：按名/按 id 取、创建、部分更新、
//! 列举、运行计数器自增。所有实现必须保证同作用域重名创建返回 Conflict，
//! 且 increment_run_id 对同一 agent 串行（每 agent 全序，跨 agent 无要求）。

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::AgentError;
use crate::db::models::{AgentRecord, MemoryEntry, MemoryScope, MemoryUpdate, NewMemory};

/// 记忆仓库 trait：Memory Store 之下的持久化边界
#[async_trait]
pub trait MemoryRepository: Send + Sync {
    /// 按 id 取条目
    async fn get(&self, id: Uuid) -> Result<Option<MemoryEntry>, AgentError>;

    /// 按 (name, 精确作用域元组) 取条目，不做层级回退
    async fn get_by_name(
        &self,
        name: &str,
        scope: &MemoryScope,
    ) -> Result<Option<MemoryEntry>, AgentError>;

    /// 创建条目；四元组重复时返回 Conflict
    async fn create(&self, entry: NewMemory) -> Result<MemoryEntry, AgentError>;

    /// 部分更新；id 不存在返回 NotFound，改名撞同作用域重名返回 Conflict
    async fn update(&self, id: Uuid, fields: MemoryUpdate) -> Result<MemoryEntry, AgentError>;

    /// 列举 agent 可见的全部条目（全局 + 该 agent 下所有 user/session 级），
    /// 可按名称前缀过滤；顺序为底层存储的插入序
    async fn list(
        &self,
        agent_id: i64,
        name_prefix: Option<&str>,
    ) -> Result<Vec<MemoryEntry>, AgentError>;

    /// 原子自增 agent 运行计数器并返回新值；首次调用返回 1
    async fn increment_run_id(&self, agent_id: i64) -> Result<i64, AgentError>;

    /// 取 agent 记录
    async fn get_agent(&self, agent_id: i64) -> Result<Option<AgentRecord>, AgentError>;
}
