// Recommendation selector

use serde::{Deserialize, Serialize};

use super::catalog::{self, Resource, CRISIS_RESOURCES, EMERGENCY_ACTIONS, ESCALATION_SENTENCE};
use crate::analysis::RiskLevel;
use crate::models::StateLabel;

const MAX_VIDEOS: usize = 3;
const MAX_ARTICLES: usize = 3;
const MAX_LABEL_PROFESSIONALS: usize = 2;

/// Human-readable bucket for classifier confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Moderate,
    Low,
}

impl ConfidenceLevel {
    /// `>= 0.8` high, `>= 0.6` moderate, otherwise low
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceLevel::High
        } else if confidence >= 0.6 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High confidence",
            ConfidenceLevel::Moderate => "Moderate confidence",
            ConfidenceLevel::Low => "Low confidence",
        }
    }
}

/// Resources and guidance for a (label, risk, confidence) triple
///
/// Never contains conversation text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationBundle {
    pub primary_concern: StateLabel,
    pub risk_level: RiskLevel,
    pub confidence_level: ConfidenceLevel,
    pub videos: Vec<Resource>,
    pub articles: Vec<Resource>,
    pub professional_resources: Vec<Resource>,
    pub immediate_actions: Vec<&'static str>,
    pub personalized_message: String,
    pub follow_up_suggestions: Vec<&'static str>,
}

/// Select the recommendation bundle
pub fn select(state: StateLabel, risk: RiskLevel, confidence: f64) -> RecommendationBundle {
    let entry = catalog::entry(state);

    let (professional_resources, immediate_actions) = if risk == RiskLevel::High {
        (CRISIS_RESOURCES.to_vec(), EMERGENCY_ACTIONS.to_vec())
    } else {
        (
            entry
                .professional
                .iter()
                .take(MAX_LABEL_PROFESSIONALS)
                .copied()
                .collect(),
            catalog::immediate_actions(state).to_vec(),
        )
    };

    let mut personalized_message = entry.message.to_string();
    if risk == RiskLevel::High {
        personalized_message.push_str(ESCALATION_SENTENCE);
    }

    RecommendationBundle {
        primary_concern: state,
        risk_level: risk,
        confidence_level: ConfidenceLevel::from_confidence(confidence),
        videos: entry.videos.iter().take(MAX_VIDEOS).copied().collect(),
        articles: entry.articles.iter().take(MAX_ARTICLES).copied().collect(),
        professional_resources,
        immediate_actions,
        personalized_message,
        follow_up_suggestions: entry.follow_up.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    #[test]
    fn test_high_risk_uses_crisis_resources() {
        for label in StateLabel::ALL {
            for confidence in [0.1, 0.65, 0.95] {
                let bundle = select(label, RiskLevel::High, confidence);
                assert_eq!(bundle.professional_resources, CRISIS_RESOURCES.to_vec());
                assert_eq!(bundle.immediate_actions, EMERGENCY_ACTIONS.to_vec());
                assert!(bundle.personalized_message.ends_with(ESCALATION_SENTENCE));
            }
        }
    }

    #[test]
    fn test_bounds_for_every_label_and_level() {
        for label in StateLabel::ALL {
            for risk in LEVELS {
                let bundle = select(label, risk, 0.5);
                assert!(bundle.videos.len() <= 3);
                assert!(bundle.articles.len() <= 3);
                assert!(!bundle.professional_resources.is_empty());
                assert!(!bundle.immediate_actions.is_empty());
                assert_eq!(bundle.primary_concern, label);
            }
        }
    }

    #[test]
    fn test_non_high_uses_label_catalog() {
        let bundle = select(StateLabel::Depression, RiskLevel::Medium, 0.75);
        assert_eq!(bundle.professional_resources.len(), 2);
        assert_eq!(bundle.videos.len(), 3);
        assert_eq!(bundle.immediate_actions[0], "Establish a daily routine with small, achievable goals");
        assert!(!bundle.personalized_message.ends_with(ESCALATION_SENTENCE));
        assert_eq!(bundle.confidence_level, ConfidenceLevel::Moderate);
    }

    #[test]
    fn test_suicidal_without_high_risk_does_not_panic() {
        let bundle = select(StateLabel::Suicidal, RiskLevel::Medium, 0.3);
        assert_eq!(bundle.immediate_actions, catalog::immediate_actions(StateLabel::Normal).to_vec());
        assert_eq!(bundle.professional_resources.len(), 2);
    }

    #[test]
    fn test_confidence_descriptors() {
        assert_eq!(ConfidenceLevel::from_confidence(0.8), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.79), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_confidence(0.6), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_confidence(0.59), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::Low.description(), "Low confidence");
    }

    #[test]
    fn test_deterministic() {
        let a = select(StateLabel::Anxiety, RiskLevel::Low, 0.4);
        let b = select(StateLabel::Anxiety, RiskLevel::Low, 0.4);
        assert_eq!(a, b);
    }
}
