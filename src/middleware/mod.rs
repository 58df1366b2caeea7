//! Middleware layer.
//!
//! Cross-cutting concerns that wrap every routed request. Currently only
//! request tracing.

pub mod trace;
