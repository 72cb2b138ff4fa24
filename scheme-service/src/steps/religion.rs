use async_trait::async_trait;
use dialog_flow::{Context, Reply, Result, Step, StepResult};
use tracing::info;

use super::types::{COMMUNITY_MENU, RELIGION_LABELS, session_keys};

const COMMUNITY_PROMPT: &str =
    "Things going well :) What is your community? enter the number alone";
const NUMBER_REPROMPT: &str = "Please provide a valid positive number";

/// Records the respondent's religion and asks the community question.
pub struct ReligionStep;

#[async_trait]
impl Step for ReligionStep {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, context: Context) -> Result<StepResult> {
        let input: String = context.get(session_keys::USER_INPUT).unwrap_or_default();

        let religion = match input.trim().parse::<usize>() {
            Ok(code) if (1..=RELIGION_LABELS.len()).contains(&code) => RELIGION_LABELS[code - 1],
            _ => return Ok(StepResult::stay(Reply::text(NUMBER_REPROMPT))),
        };

        info!(religion, "religion recorded");
        context.set(session_keys::RELIGION, religion);

        Ok(StepResult::advance(Reply::menu(
            COMMUNITY_PROMPT,
            COMMUNITY_MENU.iter().map(|s| s.to_string()).collect(),
        )))
    }
}
