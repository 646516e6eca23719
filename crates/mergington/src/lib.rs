//! The shared library for Mergington, the school activity signup service.
//!
//! This library provides the pieces shared between the backend and its clients:
//! the activity data model, response bodies, error types and logging setup.

pub mod data;
pub mod errors;
pub mod log;

pub use serde;
pub use serde_json;
pub use tracing;
