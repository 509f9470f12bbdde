//! 提示模板：变量提取与解析填充

pub mod extract;
pub mod resolver;

pub use extract::extract_variables;
pub use resolver::{ResolvedTemplate, TemplateResolver};
