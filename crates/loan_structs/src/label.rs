use serde::{Deserialize, Serialize};

/// Terminal statuses that count as a bad outcome.
pub const BAD_STATUSES: [&str; 5] = [
    "Charged Off",
    "Default",
    "Late (31-120 days)",
    "Late (16-30 days)",
    "Does not meet the credit policy. Status:Charged Off",
];

/// Terminal statuses that count as a good outcome.
pub const GOOD_STATUSES: [&str; 2] = [
    "Fully Paid",
    "Does not meet the credit policy. Status:Fully Paid",
];

/// Outcome derived from a free-text `loan_status`.
///
/// Anything outside the two terminal sets is `Unlabeled`; such rows are
/// excluded from the normalized table rather than assigned a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum LoanLabel {
    /// Default-like outcome, target 1.
    Bad,
    /// Repaid, target 0.
    Good,
    /// In progress or unknown.
    Unlabeled,
}

impl LoanLabel {
    /// Maps a raw status string to its label. Matching is exact.
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        if BAD_STATUSES.contains(&status) {
            Self::Bad
        } else if GOOD_STATUSES.contains(&status) {
            Self::Good
        } else {
            Self::Unlabeled
        }
    }

    /// Returns the binary target, or `None` for unlabeled rows.
    #[must_use]
    pub const fn target(self) -> Option<i64> {
        match self {
            Self::Bad => Some(1),
            Self::Good => Some(0),
            Self::Unlabeled => None,
        }
    }
}
