//! 直接工具注册表
//!
//! 进程内工具实现 Tool trait（name / description / parameters_schema / execute），
//! 执行上下文显式传入而非从环境重建。注册表构建一次后不可变地交给运行协作方，
//! schema 映射与外部工具服务的目录同构，便于合并成完整工具集。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::core::ExecutionContext;

/// 工具 trait：名称、描述（供 LLM 理解）、参数 schema、异步执行
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// 参数 JSON Schema；默认空对象表示无参数
    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 执行工具；作用域上下文由调用方显式传入
    async fn execute(&self, ctx: &ExecutionContext, args: Value) -> Result<String, String>;
}

/// 工具注册表：按名称存储 Arc<dyn Tool>
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub async fn execute(
        &self,
        name: &str,
        ctx: &ExecutionContext,
        args: Value,
    ) -> Result<String, String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| format!("Unknown tool: {name}"))?;
        tool.execute(ctx, args).await
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// 名称 -> {description, parameters} 映射，与工具服务 schema 目录同构
    pub fn to_schemas(&self) -> Map<String, Value> {
        self.tools
            .iter()
            .map(|(name, tool)| {
                (
                    name.clone(),
                    json!({
                        "description": tool.description(),
                        "parameters": tool.parameters_schema()
                    }),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercase the given text"
        }

        async fn execute(&self, _ctx: &ExecutionContext, args: Value) -> Result<String, String> {
            let text = args.get("text").and_then(|v| v.as_str()).unwrap_or("");
            Ok(text.to_uppercase())
        }
    }

    #[tokio::test]
    async fn test_register_and_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(UpperTool);

        let ctx = ExecutionContext::new(1);
        let out = registry
            .execute("upper", &ctx, json!({"text": "hive"}))
            .await
            .unwrap();
        assert_eq!(out, "HIVE");
    }

    #[tokio::test]
    async fn test_unknown_tool_errors() {
        let registry = ToolRegistry::new();
        let ctx = ExecutionContext::new(1);
        let err = registry.execute("missing", &ctx, json!({})).await.unwrap_err();
        assert!(err.contains("Unknown tool"));
    }

    #[test]
    fn test_schemas_shape() {
        let mut registry = ToolRegistry::new();
        registry.register(UpperTool);
        let schemas = registry.to_schemas();
        assert!(schemas["upper"]["description"]
            .as_str()
            .unwrap()
            .contains("Uppercase"));
        assert_eq!(schemas["upper"]["parameters"]["type"], "object");
    }
}
