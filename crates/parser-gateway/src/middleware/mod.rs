//! Middleware stack for the HTTP gateway.
//!
//! Layer order: Request → BodyLimit → Tracing → Handler

pub mod tracing;

pub use self::tracing::{TracingLayer, REQUEST_ID_HEADER};
