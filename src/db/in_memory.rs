//! 内存仓库实现
//!
//! 测试与无持久化场景的默认实现：单把 Mutex 保全部表，
//! 四元组唯一性在插入前检查，运行计数器与条目表同锁因而天然串行。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::AgentError;
use crate::db::models::{AgentRecord, MemoryEntry, MemoryScope, MemoryUpdate, NewMemory};
use crate::db::repository::MemoryRepository;

#[derive(Default)]
struct Tables {
    /// 插入序保存，list 直接按此序返回
    entries: Vec<MemoryEntry>,
    run_counters: HashMap<i64, i64>,
    agents: HashMap<i64, AgentRecord>,
}

/// 内存实现：Vec 保序 + HashMap 计数器
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置 agent 记录（测试用）
    pub async fn seed_agent(&self, id: i64, name: impl Into<String>) {
        let mut t = self.tables.lock().await;
        t.agents.insert(
            id,
            AgentRecord {
                id,
                name: name.into(),
                run_id: 0,
            },
        );
    }
}

fn same_key(e: &MemoryEntry, name: &str, scope: &MemoryScope) -> bool {
    e.name == name && &e.scope == scope
}

#[async_trait]
impl MemoryRepository for InMemoryRepository {
    async fn get(&self, id: Uuid) -> Result<Option<MemoryEntry>, AgentError> {
        let t = self.tables.lock().await;
        Ok(t.entries.iter().find(|e| e.id == id).cloned())
    }

    async fn get_by_name(
        &self,
        name: &str,
        scope: &MemoryScope,
    ) -> Result<Option<MemoryEntry>, AgentError> {
        let t = self.tables.lock().await;
        Ok(t.entries.iter().find(|e| same_key(e, name, scope)).cloned())
    }

    async fn create(&self, entry: NewMemory) -> Result<MemoryEntry, AgentError> {
        let mut t = self.tables.lock().await;
        if t.entries.iter().any(|e| same_key(e, &entry.name, &entry.scope)) {
            return Err(AgentError::Conflict(entry.name));
        }
        let now = Utc::now();
        let created = MemoryEntry {
            id: Uuid::new_v4(),
            name: entry.name,
            content: entry.content,
            description: entry.description,
            read_mode: entry.read_mode,
            access: entry.access,
            scope: entry.scope,
            created_at: now,
            updated_at: now,
        };
        t.entries.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, fields: MemoryUpdate) -> Result<MemoryEntry, AgentError> {
        let mut t = self.tables.lock().await;
        let idx = t
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| AgentError::NotFound(id.to_string()))?;

        if let Some(new_name) = &fields.name {
            let scope = t.entries[idx].scope.clone();
            let collides = t
                .entries
                .iter()
                .any(|e| e.id != id && same_key(e, new_name, &scope));
            if collides {
                return Err(AgentError::Conflict(new_name.clone()));
            }
        }

        let entry = &mut t.entries[idx];
        if let Some(content) = fields.content {
            entry.content = content;
        }
        if let Some(description) = fields.description {
            entry.description = Some(description);
        }
        if let Some(name) = fields.name {
            entry.name = name;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn list(
        &self,
        agent_id: i64,
        name_prefix: Option<&str>,
    ) -> Result<Vec<MemoryEntry>, AgentError> {
        let t = self.tables.lock().await;
        Ok(t.entries
            .iter()
            .filter(|e| e.scope.agent_id == agent_id)
            .filter(|e| name_prefix.map_or(true, |p| e.name.starts_with(p)))
            .cloned()
            .collect())
    }

    async fn increment_run_id(&self, agent_id: i64) -> Result<i64, AgentError> {
        let mut t = self.tables.lock().await;
        let counter = t.run_counters.entry(agent_id).or_insert(0);
        *counter += 1;
        let value = *counter;
        if let Some(agent) = t.agents.get_mut(&agent_id) {
            agent.run_id = value;
        }
        Ok(value)
    }

    async fn get_agent(&self, agent_id: i64) -> Result<Option<AgentRecord>, AgentError> {
        let t = self.tables.lock().await;
        Ok(t.agents.get(&agent_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{AccessMode, ReadMode};

    fn new_memory(name: &str, scope: MemoryScope) -> NewMemory {
        NewMemory {
            name: name.to_string(),
            content: "c".to_string(),
            description: None,
            read_mode: ReadMode::SystemPrompt,
            access: AccessMode::ReadWrite,
            scope,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_by_name() {
        let repo = InMemoryRepository::new();
        let scope = MemoryScope::global(1);
        let created = repo.create(new_memory("notes", scope.clone())).await.unwrap();
        let found = repo.get_by_name("notes", &scope).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_key_conflicts() {
        let repo = InMemoryRepository::new();
        let scope = MemoryScope::user(1, 2);
        repo.create(new_memory("notes", scope.clone())).await.unwrap();
        let err = repo.create(new_memory("notes", scope)).await.unwrap_err();
        assert!(matches!(err, AgentError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_same_name_different_scopes_coexist() {
        let repo = InMemoryRepository::new();
        repo.create(new_memory("notes", MemoryScope::global(1))).await.unwrap();
        repo.create(new_memory("notes", MemoryScope::user(1, 2))).await.unwrap();
        repo.create(new_memory("notes", MemoryScope::session(1, Some(2), "s"))).await.unwrap();
        assert_eq!(repo.list(1, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_not_found_and_rename_conflict() {
        let repo = InMemoryRepository::new();
        let scope = MemoryScope::global(1);
        let a = repo.create(new_memory("a", scope.clone())).await.unwrap();
        repo.create(new_memory("b", scope)).await.unwrap();

        let err = repo
            .update(Uuid::new_v4(), MemoryUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::NotFound(_)));

        let err = repo
            .update(
                a.id,
                MemoryUpdate {
                    name: Some("b".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_run_counter_starts_at_one() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.increment_run_id(7).await.unwrap(), 1);
        assert_eq!(repo.increment_run_id(7).await.unwrap(), 2);
        // 不同 agent 互不影响
        assert_eq!(repo.increment_run_id(8).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seeded_agent_tracks_run_counter() {
        let repo = InMemoryRepository::new();
        repo.seed_agent(7, "assistant").await;
        repo.increment_run_id(7).await.unwrap();
        repo.increment_run_id(7).await.unwrap();

        let agent = repo.get_agent(7).await.unwrap().unwrap();
        assert_eq!(agent.name, "assistant");
        assert_eq!(agent.run_id, 2);
        assert!(repo.get_agent(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_prefix_filter_keeps_insertion_order() {
        let repo = InMemoryRepository::new();
        let scope = MemoryScope::global(1);
        repo.create(new_memory("pref_b", scope.clone())).await.unwrap();
        repo.create(new_memory("other", scope.clone())).await.unwrap();
        repo.create(new_memory("pref_a", scope)).await.unwrap();

        let names: Vec<String> = repo
            .list(1, Some("pref_"))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["pref_b", "pref_a"]);
    }
}
