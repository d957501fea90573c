//! Middleware components for HTTP request processing

pub mod edge;
pub mod trace;

pub use edge::page_guard;
pub use trace::trace_middleware;
