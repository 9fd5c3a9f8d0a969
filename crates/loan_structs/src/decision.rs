use serde::{Deserialize, Serialize};

/// Explanatory tag attached to every decision of the baseline policy.
pub const BASELINE_POLICY_REASON: &str = "baseline_policy";

/// Outcome of the decision policy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
    Approve,
    Review,
    Reject,
}

/// Fixed three-way threshold policy on the probability of default.
///
/// `p < approve_below` approves, `p >= reject_from` rejects, anything in
/// between goes to manual review.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    pub approve_below: f64,
    pub reject_from: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            approve_below: 0.03,
            reject_from: 0.08,
        }
    }
}

impl DecisionPolicy {
    /// Applies the policy to a probability of default.
    #[must_use]
    pub fn decide(&self, probability: f64) -> Decision {
        if probability < self.approve_below {
            Decision::Approve
        } else if probability < self.reject_from {
            Decision::Review
        } else {
            Decision::Reject
        }
    }
}
