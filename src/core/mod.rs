//! 核心共享类型：错误、执行上下文、响应

pub mod context;
pub mod error;
pub mod response;

pub use context::ExecutionContext;
pub use error::AgentError;
pub use response::{AgentResponse, ToolCallRecord, ToolOutputRecord};
