//! 作用域记忆存储
//!
//! 包装记忆仓库：按 session > user > global 的优先级解析命名条目，
//! 缺失时按调用方提供的作用域惰性创建（同键并发创建幂等），
//! 写操作先失效解析缓存再返回，保证后续 resolve 不读到旧值。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::core::{AgentError, ExecutionContext};
use crate::db::models::{
    AccessMode, MemoryEntry, MemoryScope, MemoryUpdate, NewMemory, ReadMode,
};
use crate::db::repository::MemoryRepository;

type CacheKey = (MemoryScope, String);

/// 解析缓存：epoch 随每次失效递增，读取方据此识别与写并发的过期回填
#[derive(Default)]
struct ResolveCache {
    entries: HashMap<CacheKey, MemoryEntry>,
    epoch: u64,
}

/// 作用域记忆存储：解析缓存 + 每键创建锁
pub struct ScopedMemoryStore {
    repo: Arc<dyn MemoryRepository>,
    cache: RwLock<ResolveCache>,
    /// (scope, name) -> 创建锁；find-or-create 的原子性靠它，而非 check-then-act
    create_locks: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl ScopedMemoryStore {
    pub fn new(repo: Arc<dyn MemoryRepository>) -> Self {
        Self {
            repo,
            cache: RwLock::new(ResolveCache::default()),
            create_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn repository(&self) -> Arc<dyn MemoryRepository> {
        Arc::clone(&self.repo)
    }

    /// 解析候选作用域：最具体在前
    fn candidate_scopes(ctx: &ExecutionContext) -> Vec<MemoryScope> {
        let mut scopes = Vec::with_capacity(3);
        if let Some(session_id) = &ctx.session_id {
            scopes.push(MemoryScope::session(
                ctx.agent_id,
                ctx.user_id,
                session_id.clone(),
            ));
        }
        if let Some(user_id) = ctx.user_id {
            scopes.push(MemoryScope::user(ctx.agent_id, user_id));
        }
        scopes.push(MemoryScope::global(ctx.agent_id));
        scopes
    }

    /// 创建作用域：由上下文给出的最具体标识决定
    fn creation_scope(ctx: &ExecutionContext) -> MemoryScope {
        match (&ctx.session_id, ctx.user_id) {
            (Some(session_id), user_id) => {
                MemoryScope::session(ctx.agent_id, user_id, session_id.clone())
            }
            (None, Some(user_id)) => MemoryScope::user(ctx.agent_id, user_id),
            (None, None) => MemoryScope::global(ctx.agent_id),
        }
    }

    /// 按优先级解析；只读，不创建
    pub async fn resolve(
        &self,
        ctx: &ExecutionContext,
        name: &str,
    ) -> Result<Option<MemoryEntry>, AgentError> {
        for scope in Self::candidate_scopes(ctx) {
            let key = (scope.clone(), name.to_string());
            let epoch = {
                let cache = self.cache.read().await;
                if let Some(entry) = cache.entries.get(&key) {
                    return Ok(Some(entry.clone()));
                }
                cache.epoch
            };
            if let Some(entry) = self.repo.get_by_name(name, &scope).await? {
                // 仓库读期间发生过失效则跳过回填，避免缓存写前的旧值
                let mut cache = self.cache.write().await;
                if cache.epoch == epoch {
                    cache.entries.insert(key, entry.clone());
                }
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// 解析，缺失则在上下文隐含的作用域创建；同键并发调用幂等（返回同一条目）
    pub async fn get_or_create(
        &self,
        ctx: &ExecutionContext,
        name: &str,
        default_content: &str,
        description: &str,
        read_mode: ReadMode,
    ) -> Result<MemoryEntry, AgentError> {
        if let Some(entry) = self.resolve(ctx, name).await? {
            return Ok(entry);
        }

        let scope = Self::creation_scope(ctx);
        let key = (scope.clone(), name.to_string());
        let key_lock = {
            let mut locks = self.create_locks.lock().await;
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        let guard = key_lock.lock().await;
        let outcome = self
            .create_locked(ctx, name, default_content, description, read_mode, &scope, &key)
            .await;
        drop(guard);
        // 创建尘埃落定后回收键锁，session 级键不随会话数无界累积
        self.create_locks.lock().await.remove(&key);
        outcome
    }

    /// 持有键锁时的创建路径：双重检查后落库，竞争落败读取胜者
    async fn create_locked(
        &self,
        ctx: &ExecutionContext,
        name: &str,
        default_content: &str,
        description: &str,
        read_mode: ReadMode,
        scope: &MemoryScope,
        key: &CacheKey,
    ) -> Result<MemoryEntry, AgentError> {
        // 双重检查：拿到键锁后另一并发创建者可能已经写入
        if let Some(entry) = self.resolve(ctx, name).await? {
            return Ok(entry);
        }

        let result = self
            .repo
            .create(NewMemory {
                name: name.to_string(),
                content: default_content.to_string(),
                description: Some(description.to_string()),
                read_mode,
                access: AccessMode::ReadWrite,
                scope: scope.clone(),
            })
            .await;

        match result {
            Ok(entry) => {
                self.invalidate(key).await;
                tracing::info!(name = %name, id = %entry.id, "memory variable created");
                Ok(entry)
            }
            // 仓库层竞争落败：读取胜者的条目返回
            Err(AgentError::Conflict(_)) => {
                self.invalidate(key).await;
                self.repo
                    .get_by_name(name, scope)
                    .await?
                    .ok_or_else(|| AgentError::NotFound(name.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// 部分更新；先失效旧键（改名时连同新键）再返回
    pub async fn update(
        &self,
        id: Uuid,
        fields: MemoryUpdate,
    ) -> Result<MemoryEntry, AgentError> {
        let existing = self
            .repo
            .get(id)
            .await?
            .ok_or_else(|| AgentError::NotFound(id.to_string()))?;

        let updated = self.repo.update(id, fields).await?;

        self.invalidate(&(existing.scope.clone(), existing.name.clone()))
            .await;
        if updated.name != existing.name {
            self.invalidate(&(updated.scope.clone(), updated.name.clone()))
                .await;
        }
        Ok(updated)
    }

    /// 列举 agent 可见条目，可选名称前缀
    pub async fn list(
        &self,
        agent_id: i64,
        name_prefix: Option<&str>,
    ) -> Result<Vec<MemoryEntry>, AgentError> {
        self.repo.list(agent_id, name_prefix).await
    }

    async fn invalidate(&self, key: &CacheKey) {
        let mut cache = self.cache.write().await;
        cache.entries.remove(key);
        cache.epoch += 1;
    }
}
