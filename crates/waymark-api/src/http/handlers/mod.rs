//! HTTP request handlers.

pub mod registry;
pub mod resolve;
