// Session module
// In-memory conversation registry with per-session locking and eviction

mod store;

pub use store::{Role, Session, SessionInfo, SessionStore, Turn};
