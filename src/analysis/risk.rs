// Risk escalation rule

use serde::{Deserialize, Serialize};
use std::fmt;

use super::signals::ConversationInsights;
use crate::models::StateLabel;

/// Coarse escalation tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which row of the decision table produced a risk level
///
/// Rows are evaluated in declaration order; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskRule {
    SuicidalState,
    CrisisIndicators,
    ConfidentMoodDisorder,
    ConfidentAnxiety,
    NormalState,
    Default,
}

impl RiskRule {
    pub fn level(&self) -> RiskLevel {
        match self {
            RiskRule::SuicidalState | RiskRule::CrisisIndicators => RiskLevel::High,
            RiskRule::ConfidentMoodDisorder | RiskRule::ConfidentAnxiety => RiskLevel::Medium,
            RiskRule::NormalState => RiskLevel::Low,
            RiskRule::Default => RiskLevel::Medium,
        }
    }
}

const MOOD_DISORDER_CONFIDENCE: f64 = 0.7;
const ANXIETY_CONFIDENCE: f64 = 0.8;

/// Assess the risk level for a classified conversation
pub fn assess_risk(state: StateLabel, confidence: f64, insights: &ConversationInsights) -> RiskLevel {
    assess_risk_with_rule(state, confidence, insights).level()
}

/// Same as [`assess_risk`], returning the matching rule instead of the level
pub fn assess_risk_with_rule(
    state: StateLabel,
    confidence: f64,
    insights: &ConversationInsights,
) -> RiskRule {
    if state == StateLabel::Suicidal {
        return RiskRule::SuicidalState;
    }
    if insights.crisis_indicators > 0 {
        return RiskRule::CrisisIndicators;
    }
    if matches!(state, StateLabel::Depression | StateLabel::Bipolar)
        && confidence > MOOD_DISORDER_CONFIDENCE
    {
        return RiskRule::ConfidentMoodDisorder;
    }
    if state == StateLabel::Anxiety && confidence > ANXIETY_CONFIDENCE {
        return RiskRule::ConfidentAnxiety;
    }
    if state == StateLabel::Normal {
        return RiskRule::NormalState;
    }
    // Unmatched combinations escalate conservatively
    RiskRule::Default
}
