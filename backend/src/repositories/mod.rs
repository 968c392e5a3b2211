//! Database repositories
//!
//! Provides data access layer for database operations, plus the
//! Postgres/Redis implementations of the auth collaborator traits.

pub mod assignment;
pub mod classroom;
pub mod ownership;
pub mod redis_revocation;
pub mod revoked_token;
pub mod user;

pub use assignment::{
    AssignmentRecord, AssignmentRepository, CreateAssignment, SubmissionRecord,
    SubmissionRepository,
};
pub use classroom::{ClassroomRecord, ClassroomRepository, CreateClassroom};
pub use ownership::PgOwnershipFacts;
pub use redis_revocation::RedisRevocationStore;
pub use revoked_token::PgRevocationStore;
pub use user::{CreateUser, PgUserDirectory, UserRecord, UserRepository};
