//! 工具服务的工具 schema 目录
//!
//! 静态元数据，与进程运行状态无关：按配置启用的工具名，
//! 给出名称 -> {description, parameters} 的映射，供合并进运行时工具集。

use serde_json::{json, Map, Value};

/// 单个已知工具的 schema；未知名称返回 None（只暴露目录里有的）
fn schema_for(name: &str) -> Option<Value> {
    let schema = match name {
        "browser_navigate" => json!({
            "description": "Navigate the browser to a specific URL",
            "parameters": {
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "The URL to navigate to" }
                },
                "required": ["url"]
            }
        }),
        "browser_snapshot" => json!({
            "description": "Capture an accessibility snapshot of the current page",
            "parameters": { "type": "object", "properties": {}, "required": [] }
        }),
        "browser_click" => json!({
            "description": "Click an element on the page",
            "parameters": {
                "type": "object",
                "properties": {
                    "element": { "type": "string", "description": "Human-readable element description" },
                    "ref": { "type": "string", "description": "Exact element reference from the page snapshot" }
                },
                "required": ["element", "ref"]
            }
        }),
        "browser_type" => json!({
            "description": "Type text into an editable element",
            "parameters": {
                "type": "object",
                "properties": {
                    "element": { "type": "string", "description": "Human-readable element description" },
                    "ref": { "type": "string", "description": "Exact element reference from the page snapshot" },
                    "text": { "type": "string", "description": "Text to type into the element" },
                    "submit": { "type": "boolean", "description": "Whether to submit (press Enter) afterwards" }
                },
                "required": ["element", "ref", "text"]
            }
        }),
        "browser_take_screenshot" => json!({
            "description": "Take a screenshot of the current page",
            "parameters": {
                "type": "object",
                "properties": {
                    "raw": { "type": "string", "description": "Optionally return a lossless PNG screenshot. JPEG by default." }
                },
                "required": []
            }
        }),
        _ => return None,
    };
    Some(schema)
}

/// 按启用列表构建 schema 映射；列表中目录没有的名称被跳过并告警
pub fn schemas_for(enabled: &[String]) -> Map<String, Value> {
    let mut map = Map::new();
    for name in enabled {
        match schema_for(name) {
            Some(schema) => {
                map.insert(name.clone(), schema);
            }
            None => {
                tracing::warn!(tool = %name, "enabled tool not in schema catalog, skipping");
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tools_have_schemas() {
        let enabled = vec![
            "browser_navigate".to_string(),
            "browser_click".to_string(),
            "browser_take_screenshot".to_string(),
        ];
        let map = schemas_for(&enabled);
        assert_eq!(map.len(), 3);
        let nav = &map["browser_navigate"];
        assert!(nav["description"].as_str().unwrap().contains("Navigate"));
        assert_eq!(nav["parameters"]["required"][0], "url");
    }

    #[test]
    fn test_unknown_tool_is_skipped() {
        let enabled = vec!["browser_navigate".to_string(), "teleport".to_string()];
        let map = schemas_for(&enabled);
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key("teleport"));
    }

    #[test]
    fn test_schema_is_static_metadata() {
        // 不依赖任何运行状态，重复调用结果一致
        let enabled = vec!["browser_snapshot".to_string()];
        assert_eq!(schemas_for(&enabled), schemas_for(&enabled));
    }
}
