//! 模板变量提取
//!
//! 从提示模板中扫描 `{{identifier}}` 占位符；标识符仅限字母与下划线。
//! 纯函数，幂等，返回去重集合。

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([a-zA-Z_]+)\}\}").expect("valid placeholder regex"))
}

/// 提取模板中的全部变量名（去重，字典序）
pub fn extract_variables(template: &str) -> BTreeSet<String> {
    placeholder_re()
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// 单个变量的占位符写法
pub fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic() {
        let vars = extract_variables("Hello {{name}}, today is {{run_id}}.");
        let expected: BTreeSet<String> =
            ["name", "run_id"].iter().map(|s| s.to_string()).collect();
        assert_eq!(vars, expected);
    }

    #[test]
    fn test_extract_dedup_and_idempotent() {
        let t = "{{a}} {{b}} {{a}} {{a}}";
        let first = extract_variables(t);
        let second = extract_variables(t);
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_identifier_grammar_letters_and_underscores_only() {
        let vars = extract_variables("{{ok_name}} {{bad-name}} {{bad1}} {{ spaced }}");
        assert_eq!(vars.len(), 1);
        assert!(vars.contains("ok_name"));
    }

    #[test]
    fn test_no_placeholders() {
        assert!(extract_variables("plain text").is_empty());
    }

    #[test]
    fn test_placeholder_roundtrip() {
        assert_eq!(placeholder("run_id"), "{{run_id}}");
    }
}
