//! Authentication and authorization
//!
//! Identity is established by the gate (JWT plus revocation plus user
//! lookup); permission is decided by a table-driven policy over the
//! identity, the action, and facts about the target resource.

mod authorizer;
mod deadline;
mod gate;
mod identity;
mod jwt;
mod middleware;
mod password;
mod policy;
mod revocation;

pub use authorizer::{AssignmentFacts, Authorizer, OwnershipFacts, SubmissionFacts};
pub use deadline::check_submission_window;
pub use gate::{bearer_token, AuthOutcome, Authenticator, UserDirectory};
pub use identity::Identity;
pub use jwt::{Claims, IssuedToken, JwtService, TokenError};
pub use middleware::{auth_middleware, AuthUser};
pub use password::PasswordService;
pub use policy::{
    decide, precheck, submission_scope, Action, Decision, DenyReason, Resource, ResourceFacts,
    SubmissionScope,
};
pub use revocation::{spawn_purge_task, InMemoryRevocationStore, RevocationEntry, RevocationStore};
