//! Business logic services
//!
//! Services encapsulate business logic and coordinate between the auth
//! core and the repositories.

pub mod auth;
pub mod classroom;

pub use auth::AuthService;
pub use classroom::{AssignmentService, ClassroomService};
