// Mindguard - Conversation risk and psychological-state inference
// Library exports

pub mod analysis; // Lexical signals and risk escalation
pub mod config;
pub mod crisis; // Keyword catalog and per-message crisis gate
pub mod errors;
pub mod models; // TF-IDF state classifier and artifacts
pub mod pipeline;
pub mod providers; // Reply generation seam
pub mod recommend;
pub mod session;
pub mod text;
pub mod training; // Dataset loading and model fitting

pub use pipeline::{ChatReply, ConversationAnalysis, Pipeline, SessionReport};
