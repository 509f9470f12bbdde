//! 进程内工具：注册表、执行策略与记忆工具实现

pub mod executor;
pub mod memory_tools;
pub mod registry;

pub use executor::ToolExecutor;
pub use memory_tools::{GetMemoryTool, ListMemoriesTool, StoreMemoryTool};
pub use registry::{Tool, ToolRegistry};
