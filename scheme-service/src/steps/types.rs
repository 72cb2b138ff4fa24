// Shared vocabulary of the survey flow: context keys, answer label tables
// and the segment option computation.

pub mod session_keys {
    pub const USER_INPUT: &str = "user_input";
    pub const AGE: &str = "age";
    pub const RELIGION: &str = "religion";
    pub const COMMUNITY: &str = "community";
    pub const INCOME: &str = "income";
    pub const GENDER: &str = "gender";
    pub const SEGMENT: &str = "segment";
    pub const SEGMENT_OPTIONS: &str = "segment_options";
}

/// Religion labels in answer-code order (code 1 is the first entry).
pub const RELIGION_LABELS: [&str; 4] = ["hindu", "muslim", "christian", "others"];

/// Community labels in answer-code order. The menu shows "sc/st" as one
/// choice; both map to the `sc` label.
pub const COMMUNITY_LABELS: [&str; 5] = ["bc", "mbc", "oc", "sc", "others"];
pub const COMMUNITY_MENU: [&str; 5] = ["bc", "mbc", "oc", "sc/st", "others"];

/// Gender labels in answer-code order.
pub const GENDER_LABELS: [&str; 3] = ["male", "female", "others"];

/// Beneficiary segment choices offered for a given gender and age.
///
/// The order is load-bearing: the user answers the segment question with a
/// 1-based index into this list, so membership and ordering must stay stable
/// for a given (gender, age) pair.
pub fn segment_options(gender: &str, age: i64) -> Vec<String> {
    let mut options = vec![
        "Student",
        "Farmer",
        "Government Employee",
        "Sports person",
        "Unemployed",
    ];
    if gender == "female" {
        options.push("Widow/Destitute women");
    }
    options.push("Others");

    if age <= 18 {
        options.retain(|opt| {
            !matches!(*opt, "Farmer" | "Government Employee" | "Widow/Destitute women")
        });
    } else if age > 24 {
        options.retain(|opt| *opt != "Student");
    }

    options.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn young_female_loses_widow_and_employment_segments() {
        let options = segment_options("female", 16);
        assert_eq!(
            options,
            vec!["Student", "Sports person", "Unemployed", "Others"]
        );
    }

    #[test]
    fn adult_female_keeps_widow_option_before_others() {
        let options = segment_options("female", 30);
        assert_eq!(
            options,
            vec![
                "Farmer",
                "Government Employee",
                "Sports person",
                "Unemployed",
                "Widow/Destitute women",
                "Others"
            ]
        );
    }

    #[test]
    fn adult_male_has_no_widow_option() {
        let options = segment_options("male", 30);
        assert_eq!(
            options,
            vec![
                "Farmer",
                "Government Employee",
                "Sports person",
                "Unemployed",
                "Others"
            ]
        );
    }

    #[test]
    fn student_age_band_keeps_student() {
        for age in [19, 24] {
            let options = segment_options("male", age);
            assert!(options.contains(&"Student".to_string()), "age {age}");
            assert!(options.contains(&"Farmer".to_string()), "age {age}");
        }
    }

    #[test]
    fn religion_codes_map_in_fixed_order() {
        assert_eq!(RELIGION_LABELS[0], "hindu");
        assert_eq!(RELIGION_LABELS[1], "muslim");
        assert_eq!(RELIGION_LABELS[2], "christian");
        assert_eq!(RELIGION_LABELS[3], "others");
    }
}
