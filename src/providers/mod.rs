// Response generation
//
// The conversational reply engine is an external collaborator. This module
// defines the seam it plugs into and a canned responder used when no engine
// is configured.

use anyhow::Result;
use async_trait::async_trait;

use crate::session::Turn;

pub mod fallback;

pub use fallback::FallbackResponder;

/// Trait for reply generators
///
/// Implementations receive the raw user message and the transcript so far
/// (earlier turns only). Crisis messages never reach a generator.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produce a reply for `user_text`
    async fn generate(&self, user_text: &str, context: &[Turn]) -> Result<String>;

    /// Generator name for logging
    fn name(&self) -> &str;
}
