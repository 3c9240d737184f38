// Recommendation module
// Deterministic mapping from (state, risk, confidence) to support resources

mod catalog;
mod selector;

pub use catalog::{Resource, CRISIS_RESOURCES, EMERGENCY_ACTIONS, ESCALATION_SENTENCE};
pub use selector::{select, ConfidenceLevel, RecommendationBundle};
