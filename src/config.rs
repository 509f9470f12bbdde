//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `HIVE__*` 覆盖（双下划线表示嵌套，如 `HIVE__RUNNER__TIMEOUT_SECS=60`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub runner: RunnerSection,
    #[serde(default)]
    pub memory: MemorySection,
    #[serde(default)]
    pub tool_servers: ToolServersSection,
}

/// [app] 段：应用名、对话轮数上限
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    /// 对话历史保留轮数（短期记忆）
    #[serde(default = "default_max_context_turns")]
    pub max_context_turns: usize,
}

// 段缺失时走手写 Default，与 serde 字段默认保持同一组值
impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            max_context_turns: default_max_context_turns(),
        }
    }
}

fn default_max_context_turns() -> usize {
    20
}

/// [runner] 段：运行后端超时
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// 单次运行超时（秒）
    #[serde(default = "default_run_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_run_timeout_secs(),
        }
    }
}

fn default_run_timeout_secs() -> u64 {
    120
}

/// [memory] 段：持久化位置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MemorySection {
    /// SQLite 文件路径；未设置时用内存仓库
    pub database_path: Option<PathBuf>,
}

/// [tool_servers] 段：工具服务配置文件与单次工具调用超时
#[derive(Debug, Clone, Deserialize)]
pub struct ToolServersSection {
    /// 工具服务 JSON 配置路径，缺失时外部工具不可用
    pub config_path: Option<PathBuf>,
    /// 单次工具调用超时（秒）
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl Default for ToolServersSection {
    fn default() -> Self {
        Self {
            config_path: None,
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

fn default_tool_timeout_secs() -> u64 {
    30
}

/// 从 config 目录加载配置，环境变量 HIVE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 HIVE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("HIVE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_any_source() {
        let cfg = load_config(None).unwrap();
        assert_eq!(cfg.app.max_context_turns, 20);
        assert_eq!(cfg.runner.timeout_secs, 120);
        assert_eq!(cfg.tool_servers.tool_timeout_secs, 30);
        assert!(cfg.memory.database_path.is_none());
    }

    #[test]
    fn test_partial_file_keeps_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hive.toml");
        // 只给 [app].name：同段缺失字段与整段缺失的段都要落默认值
        std::fs::write(&path, "[app]\nname = \"hive-test\"\n").unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.app.name.as_deref(), Some("hive-test"));
        assert_eq!(cfg.app.max_context_turns, 20);
        assert_eq!(cfg.runner.timeout_secs, 120);
        assert_eq!(cfg.tool_servers.tool_timeout_secs, 30);
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hive.toml");
        std::fs::write(
            &path,
            "[runner]\ntimeout_secs = 7\n\n[app]\nname = \"hive-test\"\n",
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.runner.timeout_secs, 7);
        assert_eq!(cfg.app.name.as_deref(), Some("hive-test"));
    }
}
