//! Score normalization and rating.
//!
//! Every metric lands on a 0-10 scale where 10 is best. Most tools report a
//! count of findings, which is turned into a score by subtracting a penalty
//! from 10 and clamping.

use serde::{Deserialize, Serialize};

/// Best possible score.
pub const MAX_SCORE: f64 = 10.0;

/// Score reported when a tool or its configuration is unavailable.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Rating thresholds (inclusive lower bounds).
pub mod thresholds {
    pub const EXCELLENT: f64 = 9.0;
    pub const GOOD: f64 = 7.0;
    pub const AVERAGE: f64 = 5.0;
    pub const POOR: f64 = 3.0;
}

/// npm audit severity weights.
pub mod severity_weights {
    pub const CRITICAL: f64 = 4.0;
    pub const HIGH: f64 = 3.0;
    pub const MODERATE: f64 = 2.0;
    pub const LOW: f64 = 1.0;
}

/// Clamp a score into [0, 10]. NaN maps to 0.
pub fn clamp(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, MAX_SCORE)
}

/// `max(0, 10 - min(10, penalty))`.
pub fn penalty_score(penalty: f64) -> f64 {
    clamp(MAX_SCORE - penalty.min(MAX_SCORE))
}

/// Mean of `total` over `count`, or 0 when there is nothing to divide by.
pub fn per_item(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    per_item(values.iter().sum(), values.len())
}

/// Weight for an npm audit severity label.
pub fn severity_weight(severity: &str) -> f64 {
    match severity {
        "critical" => severity_weights::CRITICAL,
        "high" => severity_weights::HIGH,
        "moderate" => severity_weights::MODERATE,
        "low" => severity_weights::LOW,
        _ => severity_weights::LOW,
    }
}

/// Qualitative label derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    Good,
    Average,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
}

impl Rating {
    /// Map a score onto its rating.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= thresholds::EXCELLENT => Rating::Excellent,
            s if s >= thresholds::GOOD => Rating::Good,
            s if s >= thresholds::AVERAGE => Rating::Average,
            s if s >= thresholds::POOR => Rating::Poor,
            _ => Rating::VeryPoor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Average => "Average",
            Rating::Poor => "Poor",
            Rating::VeryPoor => "Very Poor",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Format a score for display with one decimal.
pub fn display(score: f64) -> String {
    format!("{:.1}", score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(Rating::from_score(10.0), Rating::Excellent);
        assert_eq!(Rating::from_score(9.0), Rating::Excellent);
        assert_eq!(Rating::from_score(8.99), Rating::Good);
        assert_eq!(Rating::from_score(7.0), Rating::Good);
        assert_eq!(Rating::from_score(6.99), Rating::Average);
        assert_eq!(Rating::from_score(5.0), Rating::Average);
        assert_eq!(Rating::from_score(4.99), Rating::Poor);
        assert_eq!(Rating::from_score(3.0), Rating::Poor);
        assert_eq!(Rating::from_score(2.99), Rating::VeryPoor);
        assert_eq!(Rating::from_score(0.0), Rating::VeryPoor);
    }

    #[test]
    fn test_rating_labels() {
        assert_eq!(Rating::VeryPoor.to_string(), "Very Poor");
        assert_eq!(Rating::Excellent.as_str(), "Excellent");
    }

    #[test]
    fn test_penalty_score_clamps() {
        assert_eq!(penalty_score(0.0), 10.0);
        assert_eq!(penalty_score(2.5), 7.5);
        assert_eq!(penalty_score(10.0), 0.0);
        assert_eq!(penalty_score(1e12), 0.0);
        assert_eq!(penalty_score(f64::INFINITY), 0.0);
        // Negative penalties cannot push a score above 10.
        assert_eq!(penalty_score(-3.0), 10.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(-1.5), 0.0);
        assert_eq!(clamp(11.0), 10.0);
        assert_eq!(clamp(f64::NAN), 0.0);
        assert_eq!(clamp(6.25), 6.25);
    }

    #[test]
    fn test_per_item_and_mean() {
        assert_eq!(per_item(9.0, 3), 3.0);
        assert_eq!(per_item(9.0, 0), 0.0);
        assert_eq!(mean(&[10.0, 5.0, 0.0, 5.0]), 5.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_severity_weights() {
        assert_eq!(severity_weight("critical"), 4.0);
        assert_eq!(severity_weight("high"), 3.0);
        assert_eq!(severity_weight("moderate"), 2.0);
        assert_eq!(severity_weight("low"), 1.0);
        assert_eq!(severity_weight("info"), 1.0);
    }

    #[test]
    fn test_display_rounds_one_decimal() {
        assert_eq!(display(7.24), "7.2");
        assert_eq!(display(7.26), "7.3");
        assert_eq!(display(10.0), "10.0");
    }
}
