use async_trait::async_trait;
use dialog_flow::{Context, FlowError, Reply, Result, Step, StepResult};
use tracing::info;

use super::types::{GENDER_LABELS, segment_options, session_keys};

const SEGMENT_PROMPT: &str = "Got it! What is your beneficiary segment? enter the number";
const NUMBER_REPROMPT: &str = "Please provide a valid positive number";

/// Records the respondent's gender, computes the segment option list from
/// gender and age, and asks the segment question.
///
/// The option list is stored in the context so the segment step resolves the
/// numeric answer against exactly the list this step showed.
pub struct GenderStep;

#[async_trait]
impl Step for GenderStep {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, context: Context) -> Result<StepResult> {
        let input: String = context.get(session_keys::USER_INPUT).unwrap_or_default();

        let gender = match input.trim().parse::<usize>() {
            Ok(code) if (1..=GENDER_LABELS.len()).contains(&code) => GENDER_LABELS[code - 1],
            _ => return Ok(StepResult::stay(Reply::text(NUMBER_REPROMPT))),
        };

        let age: i64 = context
            .get(session_keys::AGE)
            .ok_or_else(|| FlowError::ContextError("age not found".to_string()))?;

        let options = segment_options(gender, age);

        info!(gender, age, options = options.len(), "gender recorded");
        context.set(session_keys::GENDER, gender);
        context.set(session_keys::SEGMENT_OPTIONS, &options);

        Ok(StepResult::advance(Reply::menu(SEGMENT_PROMPT, options)))
    }
}
