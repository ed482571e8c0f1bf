//! State management module
//!
//! This module handles application state:
//! - Session-scoped artifacts and action gating (session.rs)

pub mod session;
