//! SQLite 仓库实现
//!
//! 单连接 + Mutex 串行访问；四元组唯一性由 UNIQUE 索引保证（NULL 以哨兵值折叠），
//! 约束冲突映射为 Conflict。运行计数器用 UPSERT 自增并在同一把锁内读回，
//! 保证每 agent 的增量全序。

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::core::AgentError;
use crate::db::models::{
    AccessMode, AgentRecord, MemoryEntry, MemoryScope, MemoryUpdate, NewMemory, ReadMode,
};
use crate::db::repository::MemoryRepository;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS memories (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    content     TEXT NOT NULL,
    description TEXT,
    read_mode   TEXT NOT NULL,
    access      TEXT NOT NULL,
    agent_id    INTEGER NOT NULL,
    user_id     INTEGER,
    session_id  TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_memories_scope_name
    ON memories(agent_id, IFNULL(user_id, -1), IFNULL(session_id, ''), name);
CREATE TABLE IF NOT EXISTS agents (
    id      INTEGER PRIMARY KEY,
    name    TEXT NOT NULL,
    run_id  INTEGER NOT NULL DEFAULT 0
);
";

/// SQLite 实现：bundled rusqlite，适合单进程部署
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// 打开（或创建）数据库文件并建表
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let conn = Connection::open(path).map_err(data_err)?;
        conn.execute_batch(SCHEMA).map_err(data_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 预置 agent 记录
    pub fn seed_agent(&self, id: i64, name: &str) -> Result<(), AgentError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO agents (id, name, run_id) VALUES (?1, ?2, 0)",
            params![id, name],
        )
        .map_err(data_err)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, AgentError> {
        self.conn
            .lock()
            .map_err(|_| AgentError::DataAccess("sqlite connection lock poisoned".to_string()))
    }
}

fn data_err(e: rusqlite::Error) -> AgentError {
    AgentError::DataAccess(e.to_string())
}

/// 约束冲突 -> Conflict，其余 -> DataAccess
fn write_err(name: &str, e: rusqlite::Error) -> AgentError {
    match &e {
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            AgentError::Conflict(name.to_string())
        }
        _ => data_err(e),
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryEntry> {
    let id: String = row.get("id")?;
    let read_mode: String = row.get("read_mode")?;
    let access: String = row.get("access")?;
    let created_at: DateTime<Utc> = row.get("created_at")?;
    let updated_at: DateTime<Utc> = row.get("updated_at")?;
    Ok(MemoryEntry {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        name: row.get("name")?,
        content: row.get("content")?,
        description: row.get("description")?,
        read_mode: ReadMode::parse(&read_mode).unwrap_or(ReadMode::ToolCalling),
        access: AccessMode::parse(&access).unwrap_or(AccessMode::ReadWrite),
        scope: MemoryScope {
            agent_id: row.get("agent_id")?,
            user_id: row.get("user_id")?,
            session_id: row.get("session_id")?,
        },
        created_at,
        updated_at,
    })
}

#[async_trait]
impl MemoryRepository for SqliteRepository {
    async fn get(&self, id: Uuid) -> Result<Option<MemoryEntry>, AgentError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT * FROM memories WHERE id = ?1",
            params![id.to_string()],
            row_to_entry,
        )
        .optional()
        .map_err(data_err)
    }

    async fn get_by_name(
        &self,
        name: &str,
        scope: &MemoryScope,
    ) -> Result<Option<MemoryEntry>, AgentError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT * FROM memories
             WHERE agent_id = ?1 AND user_id IS ?2 AND session_id IS ?3 AND name = ?4",
            params![scope.agent_id, scope.user_id, scope.session_id, name],
            row_to_entry,
        )
        .optional()
        .map_err(data_err)
    }

    async fn create(&self, entry: NewMemory) -> Result<MemoryEntry, AgentError> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO memories
             (id, name, content, description, read_mode, access,
              agent_id, user_id, session_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                id.to_string(),
                entry.name,
                entry.content,
                entry.description,
                entry.read_mode.as_str(),
                entry.access.as_str(),
                entry.scope.agent_id,
                entry.scope.user_id,
                entry.scope.session_id,
                now,
                now,
            ],
        )
        .map_err(|e| write_err(&entry.name, e))?;

        Ok(MemoryEntry {
            id,
            name: entry.name,
            content: entry.content,
            description: entry.description,
            read_mode: entry.read_mode,
            access: entry.access,
            scope: entry.scope,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(&self, id: Uuid, fields: MemoryUpdate) -> Result<MemoryEntry, AgentError> {
        let conn = self.lock()?;
        let existing = conn
            .query_row(
                "SELECT * FROM memories WHERE id = ?1",
                params![id.to_string()],
                row_to_entry,
            )
            .optional()
            .map_err(data_err)?
            .ok_or_else(|| AgentError::NotFound(id.to_string()))?;

        let name = fields.name.unwrap_or_else(|| existing.name.clone());
        let content = fields.content.unwrap_or_else(|| existing.content.clone());
        let description = fields.description.or_else(|| existing.description.clone());
        let now = Utc::now();

        conn.execute(
            "UPDATE memories SET name = ?1, content = ?2, description = ?3, updated_at = ?4
             WHERE id = ?5",
            params![name, content, description, now, id.to_string()],
        )
        .map_err(|e| write_err(&name, e))?;

        Ok(MemoryEntry {
            name,
            content,
            description,
            updated_at: now,
            ..existing
        })
    }

    async fn list(
        &self,
        agent_id: i64,
        name_prefix: Option<&str>,
    ) -> Result<Vec<MemoryEntry>, AgentError> {
        // 前缀按字面匹配：转义 LIKE 的通配符
        let escaped = name_prefix.map(|p| {
            p.replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_")
        });
        let conn = self.lock()?;
        // rowid 升序即插入序
        let mut stmt = conn
            .prepare(
                "SELECT * FROM memories
                 WHERE agent_id = ?1 AND (?2 IS NULL OR name LIKE ?2 || '%' ESCAPE '\\')
                 ORDER BY rowid",
            )
            .map_err(data_err)?;
        let rows = stmt
            .query_map(params![agent_id, escaped], row_to_entry)
            .map_err(data_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(data_err)?;
        Ok(rows)
    }

    async fn increment_run_id(&self, agent_id: i64) -> Result<i64, AgentError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO agents (id, name, run_id) VALUES (?1, 'agent-' || ?1, 1)
             ON CONFLICT(id) DO UPDATE SET run_id = run_id + 1",
            params![agent_id],
        )
        .map_err(data_err)?;
        conn.query_row(
            "SELECT run_id FROM agents WHERE id = ?1",
            params![agent_id],
            |row| row.get(0),
        )
        .map_err(data_err)
    }

    async fn get_agent(&self, agent_id: i64) -> Result<Option<AgentRecord>, AgentError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name, run_id FROM agents WHERE id = ?1",
            params![agent_id],
            |row| {
                Ok(AgentRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    run_id: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(data_err)
    }
}
