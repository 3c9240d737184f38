// Canned supportive replies for when no generator is available

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::ResponseGenerator;
use crate::session::Turn;

const REPLIES: [&str; 4] = [
    "I hear you, and I want you to know that your feelings are valid. Can you tell me more about what you're experiencing?",
    "Thank you for sharing that with me. It sounds like you're going through a challenging time. How can I best support you right now?",
    "I'm here to listen and support you. What's been weighing on your mind lately?",
    "It takes courage to reach out. I'm glad you're here. What would be most helpful for you today?",
];

/// Rotates deterministically through a fixed set of replies
#[derive(Debug, Default)]
pub struct FallbackResponder {
    next: AtomicUsize,
}

impl FallbackResponder {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseGenerator for FallbackResponder {
    async fn generate(&self, _user_text: &str, _context: &[Turn]) -> Result<String> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % REPLIES.len();
        Ok(REPLIES[index].to_string())
    }

    fn name(&self) -> &str {
        "fallback"
    }
}
