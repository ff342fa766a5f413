//! Streaming Module
//!
//! Incremental consumption of a chat response body:
//! - `consumer`: pulls reads in arrival order, honors the abort handle
//! - `framing`: decides how much text is handed on per chunk
//! - `decoder`: turns a chunk into the text fragment appended to the reply

pub mod consumer;
pub mod decoder;
pub mod framing;

pub use consumer::*;
pub use decoder::*;
pub use framing::*;
