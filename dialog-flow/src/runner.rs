//! FlowRunner – convenience wrapper that loads a session, executes exactly
//! **one** dialogue step, and persists the updated session back to storage.
//!
//! Interactive services usually want to run one step per request, send the
//! reply back to the client, and have the session saved for the next
//! roundtrip. `FlowRunner` makes that a one-liner; use
//! `Flow::execute_session` directly when you need custom persistence logic.

use std::sync::Arc;

use crate::{
    error::{FlowError, Result},
    flow::{ExecutionResult, Flow},
    storage::SessionStorage,
};

/// Orchestrates the common _load → execute → save_ pattern.
#[derive(Clone)]
pub struct FlowRunner {
    flow: Arc<Flow>,
    storage: Arc<dyn SessionStorage>,
}

impl FlowRunner {
    pub fn new(flow: Arc<Flow>, storage: Arc<dyn SessionStorage>) -> Self {
        Self { flow, storage }
    }

    /// Execute exactly one step for the given session id and persist the
    /// updated session.
    pub async fn run(&self, session_id: &str) -> Result<ExecutionResult> {
        let mut session = self
            .storage
            .get(session_id)
            .await?
            .ok_or_else(|| FlowError::SessionNotFound(session_id.to_string()))?;

        let result = self.flow.execute_session(&mut session).await?;

        self.storage.save(session).await?;

        Ok(result)
    }
}
