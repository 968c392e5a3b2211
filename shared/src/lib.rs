//! Classroom Shared Library
//!
//! This crate contains the wire types, domain models, error taxonomy and
//! validation helpers shared by the backend and its clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{Assignment, Classroom, ParseRoleError, Role, Submission, User};
pub use types::*;
