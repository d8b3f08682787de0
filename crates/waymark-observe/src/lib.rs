//! Observability for the waymark workspace.

pub mod tracing_setup;
