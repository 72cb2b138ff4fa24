use async_trait::async_trait;
use dialog_flow::{Context, Reply, Result, Step, StepResult};
use tracing::info;

use super::types::{GENDER_LABELS, session_keys};

const GENDER_PROMPT: &str = "Thanks! What is your gender? enter the number";
const INCOME_REPROMPT: &str = "Enter a valid annual income";

/// Records the family annual income and asks the gender question.
pub struct IncomeStep;

#[async_trait]
impl Step for IncomeStep {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, context: Context) -> Result<StepResult> {
        let input: String = context.get(session_keys::USER_INPUT).unwrap_or_default();

        let income = match input.trim().parse::<f64>() {
            Ok(income) if income.is_finite() && income >= 0.0 => income,
            _ => return Ok(StepResult::stay(Reply::text(INCOME_REPROMPT))),
        };

        info!(income, "income recorded");
        context.set(session_keys::INCOME, income);

        Ok(StepResult::advance(Reply::menu(
            GENDER_PROMPT,
            GENDER_LABELS.iter().map(|s| s.to_string()).collect(),
        )))
    }
}
