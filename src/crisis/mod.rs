// Crisis module
// Shared keyword catalog and the per-message crisis gate

mod detector;
mod keywords;

pub use detector::{CrisisDetector, CRISIS_RESPONSE};
pub use keywords::{KeywordCatalog, KeywordFamily, CATALOG_VERSION};
