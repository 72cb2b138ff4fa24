use thiserror::Error;

/// Slot order of the classifier's input vector.
///
/// This is the contract with the external training pipeline: the encoder and
/// the persisted model must agree on it exactly, which is checked against the
/// model artifact at startup.
pub const FEATURE_SLOTS: [&str; 20] = [
    "age",
    "income",
    "religion_christian",
    "religion_hindu",
    "religion_muslim",
    "religion_others",
    "community_bc",
    "community_mbc",
    "community_oc",
    "community_others",
    "community_sc",
    "gender_female",
    "gender_male",
    "gender_others",
    "segment_farmer",
    "segment_governmentemployee",
    "segment_sportsperson",
    "segment_student",
    "segment_unemployed",
    "segment_widow",
];

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("No feature slot for {category} value {value:?}")]
    UnknownCategoryValue { category: &'static str, value: String },
}

/// A completed survey, ready for encoding.
#[derive(Debug, Clone)]
pub struct SurveyAnswers {
    pub age: f64,
    pub income: f64,
    pub religion: String,
    pub community: String,
    pub gender: String,
    pub segment: String,
}

/// Canonical slot suffix for a category answer. Case-insensitive; `sc`/`st`
/// share one community slot, widow and destitute women share one segment
/// slot, and multi-word segment labels lose their spaces.
fn fold(category: &str, value: &str) -> String {
    let value = value.to_lowercase();
    match category {
        "community" if value == "st" => "sc".to_string(),
        "segment" if matches!(value.as_str(), "widow" | "destitute women" | "widow/destitute women") => {
            "widow".to_string()
        }
        "segment" => value.replace(' ', ""),
        _ => value,
    }
}

fn one_hot(
    features: &mut [f64],
    category: &'static str,
    value: &str,
) -> Result<(), EncodeError> {
    let slot = format!("{category}_{}", fold(category, value));
    match FEATURE_SLOTS.iter().position(|s| *s == slot) {
        Some(index) => {
            features[index] = 1.0;
            Ok(())
        }
        None => Err(EncodeError::UnknownCategoryValue {
            category,
            value: value.to_string(),
        }),
    }
}

/// Encode a completed survey into the classifier's fixed-order feature
/// vector. Pure function: same answers, same vector.
pub fn encode(answers: &SurveyAnswers) -> Result<Vec<f64>, EncodeError> {
    let mut features = vec![0.0; FEATURE_SLOTS.len()];
    features[0] = answers.age;
    features[1] = answers.income;
    one_hot(&mut features, "religion", &answers.religion)?;
    one_hot(&mut features, "community", &answers.community)?;
    one_hot(&mut features, "gender", &answers.gender)?;
    one_hot(&mut features, "segment", &answers.segment)?;
    Ok(features)
}
