// Survey question steps, one per question, executed in order.
pub mod age;
pub mod community;
pub mod gender;
pub mod income;
pub mod religion;
pub mod segment;
pub mod types;

pub use age::AgeStep;
pub use community::CommunityStep;
pub use gender::GenderStep;
pub use income::IncomeStep;
pub use religion::ReligionStep;
pub use segment::SegmentStep;
pub use types::session_keys;

use std::sync::Arc;

use dialog_flow::{Flow, FlowBuilder};

use crate::classifier::SchemeClassifier;

pub const SURVEY_FLOW_ID: &str = "scheme_survey";

/// Assemble the survey flow. Step order is the question order.
pub fn survey_flow(classifier: Arc<dyn SchemeClassifier>) -> Flow {
    FlowBuilder::new(SURVEY_FLOW_ID)
        .add_step(Arc::new(AgeStep))
        .add_step(Arc::new(ReligionStep))
        .add_step(Arc::new(CommunityStep))
        .add_step(Arc::new(IncomeStep))
        .add_step(Arc::new(GenderStep))
        .add_step(Arc::new(SegmentStep::new(classifier)))
        .build()
}
