use serde::{Deserialize, Serialize};

/// Urgency of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Act first.
    High,
    /// Worth scheduling.
    Medium,
    /// Nice to have.
    Low,
}

/// Rule-based improvement suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Stable category key (e.g. `collection`, `modal_shift`).
    pub category: String,
    /// Urgency.
    pub priority: Priority,
    /// Human readable action.
    pub message: String,
    /// Current value of the metric the rule looked at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    /// Suggested target value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f64>,
    /// Expected improvement, in the unit of the producing calculator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_impact: Option<f64>,
}

impl Recommendation {
    pub(crate) fn new(category: &str, priority: Priority, message: impl Into<String>) -> Self {
        Self {
            category: category.to_string(),
            priority,
            message: message.into(),
            current_value: None,
            target_value: None,
            expected_impact: None,
        }
    }

    pub(crate) fn with_values(mut self, current: f64, target: f64) -> Self {
        self.current_value = Some(current);
        self.target_value = Some(target);
        self
    }

    pub(crate) fn with_impact(mut self, impact: f64) -> Self {
        self.expected_impact = Some(impact);
        self
    }
}

/// Orders recommendations by priority, keeping rule order within a priority.
pub(crate) fn sort_by_priority(recommendations: &mut [Recommendation]) {
    recommendations.sort_by_key(|rec| rec.priority);
}
