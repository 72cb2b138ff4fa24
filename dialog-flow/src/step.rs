use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{context::Context, error::Result, reply::Reply};

/// Result of a single step execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Reply to send to the user for this turn.
    pub reply: Option<Reply>,
    /// What the flow should do next.
    pub next: NextAction,
}

impl StepResult {
    pub fn new(reply: Option<Reply>, next: NextAction) -> Self {
        Self { reply, next }
    }

    /// Stay on the current step and wait for corrected input.
    pub fn stay(reply: Reply) -> Self {
        Self::new(Some(reply), NextAction::WaitForInput)
    }

    /// Move on to the following step and wait for the user's next message.
    pub fn advance(reply: Reply) -> Self {
        Self::new(Some(reply), NextAction::Continue)
    }

    /// Finish the dialogue.
    pub fn end(reply: Reply) -> Self {
        Self::new(Some(reply), NextAction::End)
    }
}

/// Defines what should happen after a step completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextAction {
    /// Advance to the following step in the flow.
    Continue,
    /// Wait for new user input on the same step.
    WaitForInput,
    /// End the dialogue.
    End,
}

/// Core trait that all dialogue steps implement.
#[async_trait]
pub trait Step: Send + Sync {
    /// Unique identifier for this step.
    fn id(&self) -> &str;

    /// Execute the step against the session context.
    async fn run(&self, context: Context) -> Result<StepResult>;
}
