// Analysis module
// Lexical signal counting and the risk escalation rule

mod risk;
mod signals;

pub use risk::{assess_risk, assess_risk_with_rule, RiskLevel, RiskRule};
pub use signals::{count_signals, ConversationInsights};
