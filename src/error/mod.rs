//! Error Handling Module
//!
//! This module provides the error taxonomy of the streaming chat core:
//! - Core error type (`ChatError`, `ErrorCategory`)
//! - User-facing notification text
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use chatwire::error::{ChatError, ErrorCategory};
//!
//! let error = ChatError::http(404, "model 'llama3' not found");
//! assert_eq!(error.category(), ErrorCategory::Client);
//! assert_eq!(error.user_message(), "model 'llama3' not found");
//! ```

mod conversions;
pub mod helpers;
pub mod types;

pub use helpers::*;
pub use types::*;
