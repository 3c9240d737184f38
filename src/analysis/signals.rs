// Lexical signal counter

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::crisis::{KeywordCatalog, KeywordFamily};
use crate::text::lowercase;

/// Keyword presence counts and shape statistics for a conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationInsights {
    /// Distinct crisis phrases present
    pub crisis_indicators: usize,
    /// Distinct depression keywords present
    pub depression_indicators: usize,
    /// Distinct anxiety keywords present
    pub anxiety_indicators: usize,
    /// Mean character length of the user turns
    pub avg_message_length: f64,
    /// Whitespace-delimited words across all turns
    pub total_words: usize,
    /// Distinct turns divided by total turns
    pub unique_concerns: f64,
}

impl ConversationInsights {
    /// True for the zero-valued result produced from no turns
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Count keyword-family presence and conversation statistics
///
/// Turns are joined with a space and lowercased, nothing else. Each family
/// counts how many of its keywords occur at least once, so the count is
/// bounded by the family size. An empty slice yields the zero result.
pub fn count_signals<S: AsRef<str>>(catalog: &KeywordCatalog, turns: &[S]) -> ConversationInsights {
    if turns.is_empty() {
        return ConversationInsights::default();
    }

    let joined = turns
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    let lowered = lowercase(&joined);

    let total_chars: usize = turns.iter().map(|t| t.as_ref().chars().count()).sum();
    let distinct: HashSet<&str> = turns.iter().map(|t| t.as_ref()).collect();

    ConversationInsights {
        crisis_indicators: catalog.count_present(KeywordFamily::Crisis, &lowered),
        depression_indicators: catalog.count_present(KeywordFamily::Depression, &lowered),
        anxiety_indicators: catalog.count_present(KeywordFamily::Anxiety, &lowered),
        avg_message_length: total_chars as f64 / turns.len() as f64,
        total_words: lowered.split_whitespace().count(),
        unique_concerns: distinct.len() as f64 / turns.len() as f64,
    }
}
