//! Backend services for activity and roster management.
//!
//! This module provides the service layer abstraction over the activity
//! catalog and an in-memory implementation. Nothing is persisted: rosters
//! live as long as the process does.

pub mod activities;

pub use activities::*;
