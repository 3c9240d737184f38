// State labels and the label encoder

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::persistence::LABEL_ENCODER_ARTIFACT;
use crate::errors::ModelError;

/// Psychological state assigned to a completed conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateLabel {
    Normal,
    Depression,
    Bipolar,
    Anxiety,
    Suicidal,
}

impl StateLabel {
    pub const ALL: [StateLabel; 5] = [
        StateLabel::Normal,
        StateLabel::Depression,
        StateLabel::Bipolar,
        StateLabel::Anxiety,
        StateLabel::Suicidal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateLabel::Normal => "Normal",
            StateLabel::Depression => "Depression",
            StateLabel::Bipolar => "Bipolar",
            StateLabel::Anxiety => "Anxiety",
            StateLabel::Suicidal => "Suicidal",
        }
    }
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateLabel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s.trim())
            .ok_or_else(|| ModelError::UnknownLabel(s.to_string()))
    }
}

/// Maps labels to contiguous class indices
///
/// Classes are sorted by name, so encoded index order is alphabetical
/// (Anxiety, Bipolar, Depression, Normal, Suicidal when all are present).
/// Only labels seen in training get an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<StateLabel>,
}

impl LabelEncoder {
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a StateLabel>) -> Self {
        let mut classes: Vec<StateLabel> = labels.into_iter().copied().collect();
        classes.sort_by_key(|label| label.as_str());
        classes.dedup();
        Self { classes }
    }

    /// Rebuild from persisted class names, rejecting anything outside the
    /// closed label set
    ///
    /// Names must be unique and in the order `fit` produces, since the
    /// classifier's weight rows are indexed by position.
    pub fn from_names(names: &[String]) -> Result<Self, ModelError> {
        let classes = names
            .iter()
            .map(|name| name.parse::<StateLabel>())
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(pair) = classes
            .windows(2)
            .find(|pair| pair[0].as_str() >= pair[1].as_str())
        {
            let reason = if pair[0] == pair[1] {
                format!("duplicate class '{}'", pair[0])
            } else {
                format!("class '{}' listed before '{}'", pair[0], pair[1])
            };
            return Err(ModelError::CorruptArtifact {
                name: LABEL_ENCODER_ARTIFACT.to_string(),
                reason,
            });
        }

        Ok(Self { classes })
    }

    pub fn names(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.as_str().to_string()).collect()
    }

    pub fn encode(&self, label: StateLabel) -> Option<usize> {
        self.classes.iter().position(|c| *c == label)
    }

    pub fn decode(&self, index: usize) -> Option<StateLabel> {
        self.classes.get(index).copied()
    }

    pub fn classes(&self) -> &[StateLabel] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
