use async_trait::async_trait;
use dialog_flow::{Context, Reply, Result, Step, StepResult};
use tracing::info;

use super::types::{RELIGION_LABELS, session_keys};

const RELIGION_PROMPT: &str =
    "Thank you for your coordination! What is your Religion? enter the number alone";
const AGE_REPROMPT: &str = "Please provide a valid positive integer for the age question.";

/// Records the respondent's age and asks the religion question.
pub struct AgeStep;

#[async_trait]
impl Step for AgeStep {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, context: Context) -> Result<StepResult> {
        let input: String = context.get(session_keys::USER_INPUT).unwrap_or_default();

        let age = match input.trim().parse::<i64>() {
            Ok(age) if (0..=120).contains(&age) => age,
            _ => return Ok(StepResult::stay(Reply::text(AGE_REPROMPT))),
        };

        info!(age, "age recorded");
        context.set(session_keys::AGE, age);

        Ok(StepResult::advance(Reply::menu(
            RELIGION_PROMPT,
            RELIGION_LABELS.iter().map(|s| s.to_string()).collect(),
        )))
    }
}
