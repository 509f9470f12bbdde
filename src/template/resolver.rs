//! 模板解析器
//!
//! 将提示模板中的每个变量经记忆存储解析（缺失时按默认值策略创建），
//! `run_id` 保留名走运行计数器原子自增；任何子失败都降级为占位文本，
//! 解析永不向调用方抛硬错误——降级的提示优于没有提示。

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::ExecutionContext;
use crate::db::models::ReadMode;
use crate::memory::defaults::{default_for, GENERIC_CONTENT};
use crate::memory::ScopedMemoryStore;
use crate::template::extract::{extract_variables, placeholder};

/// run_id 计数器不可用时的固定回退值
const RUN_ID_FALLBACK: &str = "1";

/// 解析结果：填充后的文本 + 被降级的变量名
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub text: String,
    pub degraded: Vec<String>,
}

impl ResolvedTemplate {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// 模板解析器：持有记忆存储，按 agent 维护运行计数
pub struct TemplateResolver {
    store: Arc<ScopedMemoryStore>,
}

impl TemplateResolver {
    pub fn new(store: Arc<ScopedMemoryStore>) -> Self {
        Self { store }
    }

    /// 解析模板：每个变量 get_or_create，run_id 自增一次；
    /// 子失败记入 degraded 并以回退文本填充
    pub async fn resolve(&self, template: &str, ctx: &ExecutionContext) -> ResolvedTemplate {
        let names = extract_variables(template);
        let mut values: HashMap<String, String> = HashMap::with_capacity(names.len());
        let mut degraded = Vec::new();

        for name in &names {
            if name == "run_id" {
                continue;
            }
            let default = default_for(name);
            match self
                .store
                .get_or_create(ctx, name, default.content, default.description, ReadMode::SystemPrompt)
                .await
            {
                Ok(entry) => {
                    values.insert(name.clone(), entry.content);
                }
                Err(e) => {
                    tracing::warn!(variable = %name, error = %e, "memory resolution degraded");
                    values.insert(name.clone(), GENERIC_CONTENT.to_string());
                    degraded.push(name.clone());
                }
            }
        }

        if names.contains("run_id") {
            match self.store.repository().increment_run_id(ctx.agent_id).await {
                Ok(run_id) => {
                    values.insert("run_id".to_string(), run_id.to_string());
                }
                Err(e) => {
                    tracing::warn!(agent_id = ctx.agent_id, error = %e, "run_id increment failed");
                    values.insert("run_id".to_string(), RUN_ID_FALLBACK.to_string());
                    degraded.push("run_id".to_string());
                }
            }
        }

        let mut text = template.to_string();
        for (name, value) in &values {
            text = text.replace(&placeholder(name), value);
        }

        if !degraded.is_empty() {
            tracing::warn!(variables = ?degraded, "template resolved with degraded variables");
        }

        ResolvedTemplate { text, degraded }
    }
}
