// Re-export rig providers for convenience
pub use rig::providers;

// Internal modules
mod agent;
mod helpers;

// Public re-exports
pub use agent::*;
pub use helpers::{multi_turn_prompt, StreamingError, StreamingResult};
pub use rig::message::Message;
