//! 记忆层：作用域解析存储、默认值策略、消息历史

pub mod defaults;
pub mod history;
pub mod store;

pub use defaults::{default_for, VariableDefault, GENERIC_CONTENT};
pub use history::{Message, MessageHistory, Role};
pub use store::ScopedMemoryStore;
