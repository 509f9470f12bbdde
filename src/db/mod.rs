//! 持久化边界：数据模型、仓库接口与两种实现（内存 / SQLite）

pub mod in_memory;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use in_memory::InMemoryRepository;
pub use models::{
    normalize_content, AccessMode, AgentRecord, MemoryEntry, MemoryScope, MemoryUpdate, NewMemory,
    ReadMode,
};
pub use repository::MemoryRepository;
pub use sqlite::SqliteRepository;
