// Crisis keyword detector

use std::sync::Arc;

use super::keywords::{KeywordCatalog, KeywordFamily};
use crate::text::lowercase;

/// Fixed reply returned in place of a generated response when a crisis
/// phrase is detected
pub const CRISIS_RESPONSE: &str = "I'm very concerned about what you've shared. Your life has value, and there are people who want to help you through this difficult time.

Please reach out for immediate support:
• National Suicide Prevention Lifeline: 988 (available 24/7)
• Crisis Text Line: Text HOME to 741741
• Emergency Services: 911

You don't have to go through this alone. Professional counselors are available right now to talk with you. Would you like me to help you find local mental health resources?";

/// Memoryless crisis gate run on every inbound message
///
/// Matching is case-insensitive substring containment over the catalog's
/// crisis family. It will fire on phrases embedded in longer words or
/// negated sentences; false positives are accepted to keep recall at 100%
/// for the listed phrases.
#[derive(Debug, Clone)]
pub struct CrisisDetector {
    catalog: Arc<KeywordCatalog>,
}

impl CrisisDetector {
    pub fn new(catalog: Arc<KeywordCatalog>) -> Self {
        Self { catalog }
    }

    /// Detect if the message contains a crisis phrase
    pub fn detects_crisis(&self, message: &str) -> bool {
        self.matched_phrase(message).is_some()
    }

    /// First crisis phrase found in the message, if any
    pub fn matched_phrase(&self, message: &str) -> Option<&str> {
        let lowered = lowercase(message);

        let hit = self
            .catalog
            .family(KeywordFamily::Crisis)
            .iter()
            .find(|phrase| lowered.contains(phrase.as_str()))
            .map(String::as_str);

        if let Some(phrase) = hit {
            tracing::warn!(phrase = %phrase, "Crisis detected");
        }
        hit
    }

    /// All crisis phrases (for display purposes)
    pub fn phrases(&self) -> &[String] {
        self.catalog.family(KeywordFamily::Crisis)
    }
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new(Arc::new(KeywordCatalog::builtin()))
    }
}
