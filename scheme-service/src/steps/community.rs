use async_trait::async_trait;
use dialog_flow::{Context, Reply, Result, Step, StepResult};
use tracing::info;

use super::types::{COMMUNITY_LABELS, session_keys};

const INCOME_PROMPT: &str = "Ok, Next What is your family annual income?";
const NUMBER_REPROMPT: &str = "Please provide a valid positive number";

/// Records the respondent's community and asks the income question.
pub struct CommunityStep;

#[async_trait]
impl Step for CommunityStep {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, context: Context) -> Result<StepResult> {
        let input: String = context.get(session_keys::USER_INPUT).unwrap_or_default();

        let community = match input.trim().parse::<usize>() {
            Ok(code) if (1..=COMMUNITY_LABELS.len()).contains(&code) => COMMUNITY_LABELS[code - 1],
            _ => return Ok(StepResult::stay(Reply::text(NUMBER_REPROMPT))),
        };

        info!(community, "community recorded");
        context.set(session_keys::COMMUNITY, community);

        Ok(StepResult::advance(Reply::text(INCOME_PROMPT)))
    }
}
