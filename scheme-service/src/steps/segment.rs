use std::sync::Arc;

use async_trait::async_trait;
use dialog_flow::{Context, FlowError, Reply, Result, Step, StepResult};
use tracing::{error, info};

use crate::classifier::SchemeClassifier;
use crate::features::{self, SurveyAnswers};

use super::types::session_keys;

const RESULT_PROMPT: &str =
    "According to our database, the scheme(s) you might be eligible for is/are";
const NUMBER_REPROMPT: &str = "Please provide a valid positive number";

/// Final step: records the beneficiary segment, encodes the finished survey
/// and asks the classifier for eligible schemes.
pub struct SegmentStep {
    classifier: Arc<dyn SchemeClassifier>,
}

impl SegmentStep {
    pub fn new(classifier: Arc<dyn SchemeClassifier>) -> Self {
        Self { classifier }
    }
}

fn require<T: serde::de::DeserializeOwned>(context: &Context, key: &str) -> Result<T> {
    context
        .get(key)
        .ok_or_else(|| FlowError::ContextError(format!("{key} not found")))
}

#[async_trait]
impl Step for SegmentStep {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, context: Context) -> Result<StepResult> {
        let options: Vec<String> = require(&context, session_keys::SEGMENT_OPTIONS)?;

        let input: String = context.get(session_keys::USER_INPUT).unwrap_or_default();
        let segment = match input.trim().parse::<usize>() {
            Ok(choice) if (1..=options.len()).contains(&choice) => options[choice - 1].clone(),
            _ => return Ok(StepResult::stay(Reply::text(NUMBER_REPROMPT))),
        };

        info!(segment = %segment, "segment recorded");
        context.set(session_keys::SEGMENT, &segment);

        let answers = SurveyAnswers {
            age: require(&context, session_keys::AGE)?,
            income: require(&context, session_keys::INCOME)?,
            religion: require(&context, session_keys::RELIGION)?,
            community: require(&context, session_keys::COMMUNITY)?,
            gender: require(&context, session_keys::GENDER)?,
            segment,
        };

        let features = features::encode(&answers).map_err(|e| {
            error!(error = %e, "feature encoding failed");
            FlowError::StepFailed(e.to_string())
        })?;

        let schemes = self.classifier.predict(&features).map_err(|e| {
            error!(error = %e, "prediction failed");
            FlowError::StepFailed(e.to_string())
        })?;

        info!(matches = schemes.len(), "prediction complete");

        let payload =
            serde_json::to_value(&schemes).map_err(|e| FlowError::StepFailed(e.to_string()))?;

        Ok(StepResult::end(Reply::outcome(RESULT_PROMPT, payload)))
    }
}
