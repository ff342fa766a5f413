//! Data shapes shared by the pipeline: transcript entries, the chat payload
//! and provider identifiers.

pub mod message;
pub mod payload;
pub mod provider;

pub use message::*;
pub use payload::*;
pub use provider::*;
