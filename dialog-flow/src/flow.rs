use std::sync::Arc;

use tracing::debug;

use crate::{
    error::{FlowError, Result},
    reply::Reply,
    step::{NextAction, Step},
    storage::Session,
};

/// An ordered sequence of dialogue steps.
///
/// A `Flow` executes exactly one step per invocation: the step the session is
/// currently on. The step decides whether the session stays (bad input),
/// advances to the next step in order, or finishes the dialogue.
pub struct Flow {
    pub id: String,
    steps: Vec<Arc<dyn Step>>,
}

impl Flow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step to the flow. Step order is the dialogue order.
    pub fn add_step(&mut self, step: Arc<dyn Step>) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Id of the step a fresh session starts on.
    pub fn first_step_id(&self) -> Option<&str> {
        self.steps.first().map(|s| s.id())
    }

    fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id() == step_id)
    }

    /// Execute the session's current step and update the session cursor.
    pub async fn execute_session(&self, session: &mut Session) -> Result<ExecutionResult> {
        let pos = self
            .position(&session.current_step_id)
            .ok_or_else(|| FlowError::StepNotFound(session.current_step_id.clone()))?;

        let result = self.steps[pos].run(session.context.clone()).await?;

        match result.next {
            NextAction::Continue => {
                match self.steps.get(pos + 1) {
                    Some(next) => {
                        debug!(
                            flow_id = %self.id,
                            session_id = %session.id,
                            from = %session.current_step_id,
                            to = %next.id(),
                            "advancing to next step"
                        );
                        session.current_step_id = next.id().to_string();
                        Ok(ExecutionResult {
                            reply: result.reply,
                            status: ExecutionStatus::WaitingForInput,
                        })
                    }
                    // Last step advancing means the dialogue is over.
                    None => Ok(ExecutionResult {
                        reply: result.reply,
                        status: ExecutionStatus::Completed,
                    }),
                }
            }
            NextAction::WaitForInput => {
                debug!(
                    flow_id = %self.id,
                    session_id = %session.id,
                    step = %session.current_step_id,
                    "staying on current step"
                );
                Ok(ExecutionResult {
                    reply: result.reply,
                    status: ExecutionStatus::WaitingForInput,
                })
            }
            NextAction::End => Ok(ExecutionResult {
                reply: result.reply,
                status: ExecutionStatus::Completed,
            }),
        }
    }
}

/// Builder for assembling flows.
pub struct FlowBuilder {
    flow: Flow,
}

impl FlowBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            flow: Flow::new(id),
        }
    }

    pub fn add_step(mut self, step: Arc<dyn Step>) -> Self {
        self.flow.add_step(step);
        self
    }

    pub fn build(self) -> Flow {
        self.flow
    }
}

/// Outcome of executing one step of a flow.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub reply: Option<Reply>,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Waiting for the user's next message.
    WaitingForInput,
    /// Dialogue finished.
    Completed,
}
