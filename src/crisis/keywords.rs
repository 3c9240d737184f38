// Keyword catalog shared by crisis detection and signal counting

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Version of the built-in catalog
pub const CATALOG_VERSION: u32 = 1;

const CRISIS: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "hurt myself",
    "want to die",
    "better off dead",
    "self harm",
    "no point living",
];

const DEPRESSION: &[&str] = &[
    "sad",
    "hopeless",
    "empty",
    "worthless",
    "tired",
    "exhausted",
    "lonely",
    "isolated",
    "depressed",
    "down",
    "low",
];

const ANXIETY: &[&str] = &[
    "anxious",
    "worried",
    "nervous",
    "panic",
    "scared",
    "afraid",
    "restless",
    "overwhelmed",
    "stress",
    "tension",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordFamily {
    Crisis,
    Depression,
    Anxiety,
}

/// Fixed phrase lists, one per family
///
/// Families may overlap. All entries are stored lowercased so matching is a
/// plain substring test against lowercased text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCatalog {
    pub version: u32,
    pub crisis: Vec<String>,
    pub depression: Vec<String>,
    pub anxiety: Vec<String>,
}

impl KeywordCatalog {
    pub fn builtin() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            version: CATALOG_VERSION,
            crisis: owned(CRISIS),
            depression: owned(DEPRESSION),
            anxiety: owned(ANXIETY),
        }
    }

    /// Load a catalog from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword catalog: {}", path.display()))?;

        let catalog: KeywordCatalog =
            serde_json::from_str(&contents).context("Failed to parse keyword catalog JSON")?;

        catalog.normalized()
    }

    /// Lowercase and trim every entry, drop blanks, reject empty families
    fn normalized(self) -> Result<Self> {
        let clean = |family: KeywordFamily, list: Vec<String>| -> Result<Vec<String>> {
            let cleaned: Vec<String> = list
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            if cleaned.is_empty() {
                bail!("Keyword family {:?} is empty", family);
            }
            Ok(cleaned)
        };

        Ok(Self {
            version: self.version,
            crisis: clean(KeywordFamily::Crisis, self.crisis)?,
            depression: clean(KeywordFamily::Depression, self.depression)?,
            anxiety: clean(KeywordFamily::Anxiety, self.anxiety)?,
        })
    }

    pub fn family(&self, family: KeywordFamily) -> &[String] {
        match family {
            KeywordFamily::Crisis => &self.crisis,
            KeywordFamily::Depression => &self.depression,
            KeywordFamily::Anxiety => &self.anxiety,
        }
    }

    /// Number of distinct keywords of `family` present in `lowered` text
    pub fn count_present(&self, family: KeywordFamily, lowered: &str) -> usize {
        self.family(family)
            .iter()
            .filter(|keyword| lowered.contains(keyword.as_str()))
            .count()
    }
}

impl Default for KeywordCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
