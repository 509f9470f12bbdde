//! 记忆工具
//!
//! 暴露给 LLM 的记忆读写工具：
//! - get_memory：按名称解析（作用域优先级由存储层处理）
//! - store_memory：已存在则更新，否则在上下文隐含的作用域创建
//! - list_memories：列举当前 agent 可见的条目名称与描述

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::core::ExecutionContext;
use crate::db::models::{normalize_content, AccessMode, MemoryUpdate, ReadMode};
use crate::memory::defaults::GENERIC_CONTENT;
use crate::memory::store::ScopedMemoryStore;
use crate::tools::registry::Tool;

/// 读取命名记忆
pub struct GetMemoryTool {
    store: Arc<ScopedMemoryStore>,
}

impl GetMemoryTool {
    pub fn new(store: Arc<ScopedMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetMemoryTool {
    fn name(&self) -> &str {
        "get_memory"
    }

    fn description(&self) -> &str {
        "Retrieve a stored memory by name. Returns the most specific value visible in the current session."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Name of the memory to retrieve" }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, ctx: &ExecutionContext, args: Value) -> Result<String, String> {
        let name = args
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "Missing required argument: name".to_string())?;

        match self.store.resolve(ctx, name).await {
            Ok(Some(entry)) => Ok(entry.content),
            Ok(None) => Ok(format!("No memory named '{name}' found")),
            Err(e) => Err(format!("Failed to read memory '{name}': {e}")),
        }
    }
}

/// 写入命名记忆：存在则覆盖内容，缺失则按上下文作用域创建
pub struct StoreMemoryTool {
    store: Arc<ScopedMemoryStore>,
}

impl StoreMemoryTool {
    pub fn new(store: Arc<ScopedMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for StoreMemoryTool {
    fn name(&self) -> &str {
        "store_memory"
    }

    fn description(&self) -> &str {
        "Store or update a memory by name. Use this to remember facts, preferences or notes for later."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Name of the memory to store" },
                "content": { "description": "Content to store. Non-string values are serialized to JSON." }
            },
            "required": ["name", "content"]
        })
    }

    async fn execute(&self, ctx: &ExecutionContext, args: Value) -> Result<String, String> {
        let name = args
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "Missing required argument: name".to_string())?
            .to_string();
        let content = args
            .get("content")
            .map(normalize_content)
            .ok_or_else(|| "Missing required argument: content".to_string())?;

        let existing = self
            .store
            .resolve(ctx, &name)
            .await
            .map_err(|e| format!("Failed to look up memory '{name}': {e}"))?;

        match existing {
            Some(entry) => {
                if entry.access == AccessMode::ReadOnly {
                    return Err(format!("Memory '{name}' is read-only"));
                }
                self.store
                    .update(
                        entry.id,
                        MemoryUpdate {
                            content: Some(content),
                            ..Default::default()
                        },
                    )
                    .await
                    .map_err(|e| format!("Failed to update memory '{name}': {e}"))?;
                Ok(format!("Updated memory '{name}'"))
            }
            None => {
                let entry = self
                    .store
                    .get_or_create(ctx, &name, GENERIC_CONTENT, "", ReadMode::ToolCalling)
                    .await
                    .map_err(|e| format!("Failed to create memory '{name}': {e}"))?;
                self.store
                    .update(
                        entry.id,
                        MemoryUpdate {
                            content: Some(content),
                            ..Default::default()
                        },
                    )
                    .await
                    .map_err(|e| format!("Failed to write memory '{name}': {e}"))?;
                Ok(format!("Stored memory '{name}'"))
            }
        }
    }
}

/// 列举当前 agent 可见的记忆条目
pub struct ListMemoriesTool {
    store: Arc<ScopedMemoryStore>,
}

impl ListMemoriesTool {
    pub fn new(store: Arc<ScopedMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListMemoriesTool {
    fn name(&self) -> &str {
        "list_memories"
    }

    fn description(&self) -> &str {
        "List the names and descriptions of all memories visible to this agent, optionally filtered by name prefix."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prefix": { "type": "string", "description": "Only list memories whose name starts with this prefix" }
            },
            "required": []
        })
    }

    async fn execute(&self, ctx: &ExecutionContext, args: Value) -> Result<String, String> {
        let prefix = args.get("prefix").and_then(|v| v.as_str());
        let entries = self
            .store
            .list(ctx.agent_id, prefix)
            .await
            .map_err(|e| format!("Failed to list memories: {e}"))?;

        if entries.is_empty() {
            return Ok("No memories stored yet".to_string());
        }

        let lines: Vec<String> = entries
            .iter()
            .map(|e| match &e.description {
                Some(desc) if !desc.is_empty() => format!("- {}: {}", e.name, desc),
                _ => format!("- {}", e.name),
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::in_memory::InMemoryRepository;

    fn store() -> Arc<ScopedMemoryStore> {
        Arc::new(ScopedMemoryStore::new(Arc::new(InMemoryRepository::new())))
    }

    #[tokio::test]
    async fn test_store_then_get_roundtrip() {
        let store = store();
        let ctx = ExecutionContext::new(1).with_user(2);

        let set = StoreMemoryTool::new(Arc::clone(&store));
        let out = set
            .execute(&ctx, json!({"name": "favorite_color", "content": "blue"}))
            .await
            .unwrap();
        assert!(out.contains("Stored"));

        let get = GetMemoryTool::new(Arc::clone(&store));
        let out = get
            .execute(&ctx, json!({"name": "favorite_color"}))
            .await
            .unwrap();
        assert_eq!(out, "blue");
    }

    #[tokio::test]
    async fn test_store_overwrites_existing() {
        let store = store();
        let ctx = ExecutionContext::new(1);
        let set = StoreMemoryTool::new(Arc::clone(&store));

        set.execute(&ctx, json!({"name": "city", "content": "Berlin"}))
            .await
            .unwrap();
        let out = set
            .execute(&ctx, json!({"name": "city", "content": "Paris"}))
            .await
            .unwrap();
        assert!(out.contains("Updated"));

        let get = GetMemoryTool::new(store);
        assert_eq!(
            get.execute(&ctx, json!({"name": "city"})).await.unwrap(),
            "Paris"
        );
    }

    #[tokio::test]
    async fn test_store_serializes_structured_content() {
        let store = store();
        let ctx = ExecutionContext::new(1);
        let set = StoreMemoryTool::new(Arc::clone(&store));
        set.execute(&ctx, json!({"name": "prefs", "content": {"theme": "dark"}}))
            .await
            .unwrap();

        let get = GetMemoryTool::new(store);
        assert_eq!(
            get.execute(&ctx, json!({"name": "prefs"})).await.unwrap(),
            r#"{"theme":"dark"}"#
        );
    }

    #[tokio::test]
    async fn test_get_missing_reports_not_found() {
        let store = store();
        let ctx = ExecutionContext::new(1);
        let get = GetMemoryTool::new(store);
        let out = get.execute(&ctx, json!({"name": "ghost"})).await.unwrap();
        assert!(out.contains("No memory named 'ghost'"));
    }

    #[tokio::test]
    async fn test_missing_argument_is_error() {
        let store = store();
        let ctx = ExecutionContext::new(1);
        let get = GetMemoryTool::new(store);
        let err = get.execute(&ctx, json!({})).await.unwrap_err();
        assert!(err.contains("name"));
    }

    #[tokio::test]
    async fn test_list_memories() {
        let store = store();
        let ctx = ExecutionContext::new(1);
        let set = StoreMemoryTool::new(Arc::clone(&store));
        set.execute(&ctx, json!({"name": "a", "content": "1"}))
            .await
            .unwrap();
        set.execute(&ctx, json!({"name": "b", "content": "2"}))
            .await
            .unwrap();

        let list = ListMemoriesTool::new(store);
        let out = list.execute(&ctx, json!({})).await.unwrap();
        assert!(out.contains("- a"));
        assert!(out.contains("- b"));
    }

    #[tokio::test]
    async fn test_list_with_prefix_filter() {
        let store = store();
        let ctx = ExecutionContext::new(1);
        let set = StoreMemoryTool::new(Arc::clone(&store));
        set.execute(&ctx, json!({"name": "pref_a", "content": "1"}))
            .await
            .unwrap();
        set.execute(&ctx, json!({"name": "other", "content": "2"}))
            .await
            .unwrap();

        let list = ListMemoriesTool::new(store);
        let out = list.execute(&ctx, json!({"prefix": "pref_"})).await.unwrap();
        assert!(out.contains("- pref_a"));
        assert!(!out.contains("- other"));
    }

    #[tokio::test]
    async fn test_list_empty() {
        let store = store();
        let ctx = ExecutionContext::new(9);
        let list = ListMemoriesTool::new(store);
        let out = list.execute(&ctx, json!({})).await.unwrap();
        assert!(out.contains("No memories"));
    }
}
