//! 模板变量默认值策略
//!
//! 知名变量（personal_attributes / technical_knowledge / user_preferences）
//! 有固定的默认内容与描述；其余变量用通用占位文本。

/// 通用占位内容：变量不存在且无专属默认值时使用
pub const GENERIC_CONTENT: &str = "None stored yet";

/// 某个模板变量的默认内容与描述
#[derive(Debug, Clone, Copy)]
pub struct VariableDefault {
    pub content: &'static str,
    pub description: &'static str,
}

/// 按变量名给出默认值策略
pub fn default_for(name: &str) -> VariableDefault {
    match name {
        "personal_attributes" => VariableDefault {
            content: "None stored yet. You can update this by asking the agent to remember personal details.",
            description: "Personal attributes and preferences for the agent",
        },
        "technical_knowledge" => VariableDefault {
            content: "None stored yet. You can update this by asking the agent to remember technical information.",
            description: "Technical knowledge and capabilities for the agent",
        },
        "user_preferences" => VariableDefault {
            content: "None stored yet. You can update this by asking the agent to remember your preferences.",
            description: "User preferences and settings for the agent",
        },
        _ => VariableDefault {
            content: GENERIC_CONTENT,
            description: "Auto-created template variable",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_defaults() {
        let d = default_for("personal_attributes");
        assert!(d.content.starts_with("None stored yet. You can update this"));
        assert!(d.description.contains("Personal attributes"));
    }

    #[test]
    fn test_unknown_variable_gets_generic() {
        let d = default_for("weather_cache");
        assert_eq!(d.content, GENERIC_CONTENT);
    }
}
