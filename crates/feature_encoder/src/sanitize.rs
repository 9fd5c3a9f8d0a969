use std::sync::LazyLock;

use regex::Regex;

/// Category suffix of the missing-value indicator column.
pub const MISSING_CATEGORY: &str = "nan";

static INVALID_NAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("[^0-9a-zA-Z_]+").expect("feature name pattern should compile")
});

/// Replaces every run of characters outside `[0-9A-Za-z_]` with one `_`.
#[must_use]
pub fn sanitize_feature_name(name: &str) -> String {
    INVALID_NAME_CHARS.replace_all(name, "_").into_owned()
}

/// Raw (unsanitized) name of a one-hot indicator column.
#[must_use]
pub fn dummy_name(column: &str, category: &str) -> String {
    format!("{column}_{category}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_feature_name("emp_length_10+ years"), "emp_length_10_years");
        assert_eq!(sanitize_feature_name("emp_length_< 1 year"), "emp_length__1_year");
        assert_eq!(sanitize_feature_name("loan_amnt"), "loan_amnt");
        assert_eq!(sanitize_feature_name("a--b..c"), "a_b_c");
    }

    #[test]
    fn test_dummy_name() {
        assert_eq!(dummy_name("grade", "A"), "grade_A");
        assert_eq!(dummy_name("grade", MISSING_CATEGORY), "grade_nan");
    }
}
