pub mod context;
pub mod error;
pub mod flow;
pub mod reply;
pub mod runner;
pub mod step;
pub mod storage;

// Re-export commonly used types
pub use context::Context;
pub use error::{FlowError, Result};
pub use flow::{ExecutionResult, ExecutionStatus, Flow, FlowBuilder};
pub use reply::Reply;
pub use runner::FlowRunner;
pub use step::{NextAction, Step, StepResult};
pub use storage::{InMemorySessionStorage, Session, SessionStorage};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Step that accepts any non-empty input and echoes it back.
    struct CollectStep {
        id: String,
        key: String,
    }

    #[async_trait]
    impl Step for CollectStep {
        fn id(&self) -> &str {
            &self.id
        }

        async fn run(&self, context: Context) -> Result<StepResult> {
            let input: String = context.get("input").unwrap_or_default();
            if input.is_empty() {
                return Ok(StepResult::stay(Reply::text("please say something")));
            }
            context.set(&self.key, input);
            Ok(StepResult::advance(Reply::text("noted")))
        }
    }

    struct FinishStep;

    #[async_trait]
    impl Step for FinishStep {
        fn id(&self) -> &str {
            "finish"
        }

        async fn run(&self, context: Context) -> Result<StepResult> {
            let name: String = context
                .get("name")
                .ok_or_else(|| FlowError::ContextError("name not found".to_string()))?;
            Ok(StepResult::end(Reply::outcome(
                "done",
                serde_json::json!({ "name": name }),
            )))
        }
    }

    fn two_step_flow() -> Flow {
        FlowBuilder::new("test_flow")
            .add_step(Arc::new(CollectStep {
                id: "collect_name".to_string(),
                key: "name".to_string(),
            }))
            .add_step(Arc::new(FinishStep))
            .build()
    }

    #[tokio::test]
    async fn test_flow_advances_on_valid_input() {
        let flow = two_step_flow();
        let mut session = Session::new_from_step("s1".to_string(), "test_flow", "collect_name");
        session.context.set("input", "Ada");

        let result = flow.execute_session(&mut session).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::WaitingForInput);
        assert_eq!(session.current_step_id, "finish");
        let stored: String = session.context.get("name").unwrap();
        assert_eq!(stored, "Ada");
    }

    #[tokio::test]
    async fn test_flow_stays_on_invalid_input() {
        let flow = two_step_flow();
        let mut session = Session::new_from_step("s1".to_string(), "test_flow", "collect_name");
        session.context.set("input", "");

        let result = flow.execute_session(&mut session).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::WaitingForInput);
        assert_eq!(session.current_step_id, "collect_name");
        assert!(!session.context.contains("name"));
    }

    #[tokio::test]
    async fn test_flow_completes_on_end() {
        let flow = two_step_flow();
        let mut session = Session::new_from_step("s1".to_string(), "test_flow", "finish");
        session.context.set("name", "Ada");

        let result = flow.execute_session(&mut session).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Completed);
        match result.reply {
            Some(Reply::Outcome { payload, .. }) => {
                assert_eq!(payload["name"], "Ada");
            }
            other => panic!("expected outcome reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_step_is_an_error() {
        let flow = two_step_flow();
        let mut session = Session::new_from_step("s1".to_string(), "test_flow", "missing");

        let err = flow.execute_session(&mut session).await.unwrap_err();
        assert!(matches!(err, FlowError::StepNotFound(_)));
    }

    #[tokio::test]
    async fn test_storage_roundtrip() {
        let storage = InMemorySessionStorage::new();
        let session = Session::new_from_step("session1".to_string(), "test_flow", "collect_name");

        storage.save(session.clone()).await.unwrap();
        let retrieved = storage.get("session1").await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().current_step_id, "collect_name");

        storage.delete("session1").await.unwrap();
        assert!(storage.get("session1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_runner_persists_progress() {
        let flow = Arc::new(two_step_flow());
        let storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
        let runner = FlowRunner::new(flow, storage.clone());

        let session = Session::new_from_step("s1".to_string(), "test_flow", "collect_name");
        session.context.set("input", "Ada");
        storage.save(session).await.unwrap();

        let result = runner.run("s1").await.unwrap();
        assert_eq!(result.status, ExecutionStatus::WaitingForInput);

        let saved = storage.get("s1").await.unwrap().unwrap();
        assert_eq!(saved.current_step_id, "finish");
    }

    #[tokio::test]
    async fn test_runner_missing_session() {
        let flow = Arc::new(two_step_flow());
        let storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
        let runner = FlowRunner::new(flow, storage);

        let err = runner.run("nope").await.unwrap_err();
        assert!(matches!(err, FlowError::SessionNotFound(_)));
    }
}
