//! Column contract between the raw dataset and the normalized table.

/// Free-text status used to derive the label. Never kept as a feature.
pub const STATUS_COLUMN: &str = "loan_status";

/// Issue date, `Mon-YYYY` in the raw file.
pub const ISSUE_DATE_COLUMN: &str = "issue_d";

/// `YYYY-MM` bucket derived from the issue date.
pub const ISSUE_MONTH_COLUMN: &str = "issue_month";

/// Binary label column of the normalized table.
pub const TARGET_COLUMN: &str = "target";

/// How a raw field is cleaned on its way into the normalized table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum FieldRule {
    /// `Mon-YYYY` parsed to the first day of the month.
    IssueDate,
    /// Label source, dropped after labeling.
    Status,
    /// Best-effort numeric parse.
    Numeric,
    /// Numeric with an optional trailing `%`.
    Percent,
    /// First run of digits as integer months.
    Term,
    /// Trimmed text, empty as missing.
    Categorical,
}

/// A raw column and its cleaning rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawField {
    pub name: &'static str,
    pub rule: FieldRule,
}

const fn field(name: &'static str, rule: FieldRule) -> RawField {
    RawField { name, rule }
}

/// Raw columns read from the accepted-loans file, in output order.
pub const RAW_FIELDS: [RawField; 23] = [
    field(ISSUE_DATE_COLUMN, FieldRule::IssueDate),
    field(STATUS_COLUMN, FieldRule::Status),
    field("loan_amnt", FieldRule::Numeric),
    field("term", FieldRule::Term),
    field("int_rate", FieldRule::Percent),
    field("installment", FieldRule::Numeric),
    field("grade", FieldRule::Categorical),
    field("sub_grade", FieldRule::Categorical),
    field("emp_length", FieldRule::Categorical),
    field("home_ownership", FieldRule::Categorical),
    field("annual_inc", FieldRule::Numeric),
    field("verification_status", FieldRule::Categorical),
    field("purpose", FieldRule::Categorical),
    field("addr_state", FieldRule::Categorical),
    field("dti", FieldRule::Numeric),
    field("delinq_2yrs", FieldRule::Numeric),
    field("inq_last_6mths", FieldRule::Numeric),
    field("open_acc", FieldRule::Numeric),
    field("pub_rec", FieldRule::Numeric),
    field("revol_bal", FieldRule::Numeric),
    field("revol_util", FieldRule::Percent),
    field("total_acc", FieldRule::Numeric),
    field("application_type", FieldRule::Categorical),
];

/// Columns of the normalized table in order.
#[must_use]
pub fn normalized_columns() -> Vec<&'static str> {
    RAW_FIELDS
        .iter()
        .filter(|f| f.rule != FieldRule::Status)
        .map(|f| f.name)
        .chain([ISSUE_MONTH_COLUMN, TARGET_COLUMN])
        .collect()
}
