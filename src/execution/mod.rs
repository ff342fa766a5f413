//! Request execution
//!
//! - `headers`: request header construction
//! - `transport`: the injectable HTTP seam and its `reqwest` implementation
//! - `fetch`: the response fetcher with failure classification and recovery

pub mod fetch;
pub mod headers;
pub mod transport;

pub use fetch::*;
pub use headers::HttpHeaderBuilder;
pub use transport::*;
