//! 运行编排集成测试

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use hive::db::{InMemoryRepository, SqliteRepository};
    use hive::memory::{MessageHistory, Role, ScopedMemoryStore};
    use hive::runner::{AgentRunner, MockRunner};
    use hive::template::TemplateResolver;
    use hive::tools::{
        GetMemoryTool, ListMemoriesTool, StoreMemoryTool, Tool, ToolExecutor, ToolRegistry,
    };
    use hive::{ExecutionContext, RunOrchestrator, RunRequest};

    fn build_orchestrator(
        store: Arc<ScopedMemoryStore>,
        runner: Arc<MockRunner>,
    ) -> RunOrchestrator {
        let mut registry = ToolRegistry::new();
        registry.register(GetMemoryTool::new(Arc::clone(&store)));
        registry.register(StoreMemoryTool::new(Arc::clone(&store)));
        registry.register(ListMemoriesTool::new(Arc::clone(&store)));

        RunOrchestrator::new(
            TemplateResolver::new(store),
            runner as Arc<dyn AgentRunner>,
            Arc::new(ToolExecutor::new(Arc::new(registry))),
            Vec::new(),
        )
    }

    fn request(agent_id: i64, template: &str, input: &str) -> RunRequest {
        RunRequest {
            agent_id: Some(agent_id),
            user_id: Some(42),
            session_id: Some("session-1".to_string()),
            template: template.to_string(),
            input: input.to_string(),
            use_external_tools: true,
            cancel: None,
        }
    }

    #[tokio::test]
    async fn test_full_run_with_curated_default_and_run_counter() {
        let store = Arc::new(ScopedMemoryStore::new(Arc::new(InMemoryRepository::new())));
        let runner = Arc::new(MockRunner::new());
        let orchestrator = build_orchestrator(Arc::clone(&store), Arc::clone(&runner));

        let mut history = MessageHistory::new(10);
        let resp = orchestrator
            .run_agent(
                request(
                    7,
                    "User notes: {{personal_attributes}}. Run #{{run_id}}.",
                    "hello",
                ),
                &mut history,
            )
            .await;

        assert!(resp.success);
        assert_eq!(resp.text, "Echo: hello");
        assert!(resp.degraded_variables.is_empty());

        let seen = runner.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].system_prompt,
            "User notes: None stored yet. You can update this by asking the agent to remember personal details.. Run #1."
        );
        // 注册的三个记忆工具都在合并后的工具集中
        assert!(seen[0].tool_schemas.contains_key("get_memory"));
        assert!(seen[0].tool_schemas.contains_key("store_memory"));
        assert!(seen[0].tool_schemas.contains_key("list_memories"));

        let roles: Vec<Role> = history.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn test_memory_written_by_tool_appears_in_next_resolution() {
        let store = Arc::new(ScopedMemoryStore::new(Arc::new(InMemoryRepository::new())));
        let runner = Arc::new(MockRunner::new());
        let orchestrator = build_orchestrator(Arc::clone(&store), runner);

        // 工具写入（模拟一次 LLM 发起的 store_memory 调用）
        let ctx = ExecutionContext::new(1).with_user(42).with_session("session-1");
        let set = StoreMemoryTool::new(Arc::clone(&store));
        set.execute(&ctx, json!({"name": "favorite_color", "content": "teal"}))
            .await
            .unwrap();

        // 下一次运行的模板解析读到新值
        let mut history = MessageHistory::new(10);
        orchestrator
            .run_agent(request(1, "Color: {{favorite_color}}", "hi"), &mut history)
            .await;
        assert_eq!(history.messages()[0].content, "Color: teal");
    }

    #[tokio::test]
    async fn test_run_counter_survives_with_sqlite_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hive.db");

        {
            let repo = Arc::new(SqliteRepository::open(&path).unwrap());
            let store = Arc::new(ScopedMemoryStore::new(repo));
            let orchestrator = build_orchestrator(store, Arc::new(MockRunner::new()));
            let mut history = MessageHistory::new(10);
            orchestrator
                .run_agent(request(1, "run {{run_id}}", "hi"), &mut history)
                .await;
            assert_eq!(history.messages()[0].content, "run 1");
        }

        // 重新打开同一数据库：计数续增而非重置
        let repo = Arc::new(SqliteRepository::open(&path).unwrap());
        let store = Arc::new(ScopedMemoryStore::new(repo));
        let orchestrator = build_orchestrator(store, Arc::new(MockRunner::new()));
        let mut history = MessageHistory::new(10);
        orchestrator
            .run_agent(request(1, "run {{run_id}}", "hi"), &mut history)
            .await;
        assert_eq!(history.messages()[0].content, "run 2");
    }

    #[tokio::test]
    async fn test_multi_turn_history_accumulates() {
        let store = Arc::new(ScopedMemoryStore::new(Arc::new(InMemoryRepository::new())));
        let orchestrator = build_orchestrator(store, Arc::new(MockRunner::new()));

        let mut history = MessageHistory::new(10);
        for input in ["one", "two"] {
            let resp = orchestrator
                .run_agent(request(1, "sys", input), &mut history)
                .await;
            assert!(resp.success);
        }
        // 每轮各一条系统提示 + 用户 + 助手
        assert_eq!(history.messages().len(), 6);
        assert_eq!(history.messages().last().unwrap().content, "Echo: two");
    }
}
