//! Utility modules for chatwire
//!
//! This module contains small helpers shared by the fetch and stream layers.

pub mod cancel;
pub mod url;
pub mod utf8_decoder;

pub use cancel::{AbortHandle, new_abort_handle};
pub use url::join_url;
pub use utf8_decoder::Utf8StreamDecoder;
