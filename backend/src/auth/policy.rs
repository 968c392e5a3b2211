//! Authorization policy
//!
//! A pure, table-driven decision over an identity, an action and the
//! ownership facts of the target resource. Evaluation order:
//!
//! 1. public actions (sign-up, login) are always allowed
//! 2. an identity is required
//! 3. the identity's role must be permitted for the action
//! 4. the target resource must exist
//! 5. ownership / membership
//! 6. the submission window, for submission writes only
//!
//! A caller who does not own a submission is denied with `NotOwner`, never
//! with `PastDeadline`.

use super::deadline::check_submission_window;
use super::identity::Identity;
use chrono::{DateTime, Utc};
use classroom_shared::{AuthError, Role};
use std::fmt;
use uuid::Uuid;

/// Operations gated by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SignUp,
    LogIn,
    ListOwnClassrooms,
    ViewClassroom,
    CreateClassroom,
    DeleteClassroom,
    JoinClassroom,
    CreateAssignment,
    ViewAssignments,
    SubmitAssignment,
    UpdateSubmission,
    DeleteSubmission,
    ViewSubmissions,
    ListOwnSubmissions,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::SignUp => "sign_up",
            Action::LogIn => "log_in",
            Action::ListOwnClassrooms => "list_own_classrooms",
            Action::ViewClassroom => "view_classroom",
            Action::CreateClassroom => "create_classroom",
            Action::DeleteClassroom => "delete_classroom",
            Action::JoinClassroom => "join_classroom",
            Action::CreateAssignment => "create_assignment",
            Action::ViewAssignments => "view_assignments",
            Action::SubmitAssignment => "submit_assignment",
            Action::UpdateSubmission => "update_submission",
            Action::DeleteSubmission => "delete_submission",
            Action::ViewSubmissions => "view_submissions",
            Action::ListOwnSubmissions => "list_own_submissions",
        }
    }

    /// Allowed without an identity
    pub fn is_public(&self) -> bool {
        matches!(self, Action::SignUp | Action::LogIn)
    }

    /// Whether `role` may attempt the action at all
    pub fn permits_role(&self, role: Role) -> bool {
        match self {
            Action::SignUp
            | Action::LogIn
            | Action::ListOwnClassrooms
            | Action::ViewClassroom
            | Action::ViewAssignments
            | Action::ViewSubmissions => true,
            Action::CreateClassroom | Action::DeleteClassroom | Action::CreateAssignment => {
                role == Role::Professor
            }
            Action::JoinClassroom
            | Action::SubmitAssignment
            | Action::UpdateSubmission
            | Action::DeleteSubmission
            | Action::ListOwnSubmissions => role == Role::Student,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The target of an action, by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    None,
    Classroom(Uuid),
    Assignment(Uuid),
    Submission(Uuid),
}

/// Ownership facts about a resource, resolved relative to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceFacts {
    /// The action has no target
    None,
    /// The id did not resolve to anything
    Missing,
    Classroom {
        owner_id: Uuid,
        is_member: bool,
    },
    Assignment {
        owner_id: Uuid,
        is_member: bool,
        due_date: DateTime<Utc>,
    },
    Submission {
        owner_id: Uuid,
        submitter_id: Uuid,
        due_date: DateTime<Utc>,
    },
}

/// Why an action was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    Unauthenticated,
    WrongRole,
    NotOwner,
    NotMember,
    UnknownResource,
    PastDeadline,
}

impl From<DenyReason> for AuthError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => AuthError::MissingCredential,
            DenyReason::WrongRole => AuthError::WrongRole,
            DenyReason::NotOwner => AuthError::NotOwner,
            DenyReason::NotMember => AuthError::NotMember,
            DenyReason::UnknownResource => AuthError::UnknownResource,
            DenyReason::PastDeadline => AuthError::PastDeadline,
        }
    }
}

/// Policy outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

impl From<Result<(), DenyReason>> for Decision {
    fn from(result: Result<(), DenyReason>) -> Self {
        match result {
            Ok(()) => Decision::Allow,
            Err(reason) => Decision::Deny(reason),
        }
    }
}

/// Which submissions a caller may list for an assignment they can see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionScope {
    All,
    OwnOnly(Uuid),
}

pub fn submission_scope(identity: &Identity) -> SubmissionScope {
    match identity.role {
        Role::Professor => SubmissionScope::All,
        Role::Student => SubmissionScope::OwnOnly(identity.user_id),
    }
}

/// Steps 2 and 3: the checks that need no resource lookup
pub fn precheck(identity: Option<&Identity>, action: Action) -> Result<&Identity, DenyReason> {
    let identity = identity.ok_or(DenyReason::Unauthenticated)?;
    if !action.permits_role(identity.role) {
        return Err(DenyReason::WrongRole);
    }
    Ok(identity)
}

/// Decide `action` for `identity` against already-resolved `facts`
pub fn decide(
    identity: Option<&Identity>,
    action: Action,
    facts: &ResourceFacts,
    now: DateTime<Utc>,
) -> Decision {
    if action.is_public() {
        return Decision::Allow;
    }
    evaluate(identity, action, facts, now).into()
}

fn evaluate(
    identity: Option<&Identity>,
    action: Action,
    facts: &ResourceFacts,
    now: DateTime<Utc>,
) -> Result<(), DenyReason> {
    let identity = precheck(identity, action)?;

    match (action, facts) {
        (_, ResourceFacts::Missing) => Err(DenyReason::UnknownResource),

        (
            Action::ListOwnClassrooms
            | Action::CreateClassroom
            | Action::JoinClassroom
            | Action::ListOwnSubmissions,
            ResourceFacts::None,
        ) => Ok(()),

        (
            Action::ViewClassroom | Action::ViewAssignments,
            ResourceFacts::Classroom { owner_id, is_member },
        ) => classroom_access(identity, *owner_id, *is_member),

        (
            Action::DeleteClassroom | Action::CreateAssignment,
            ResourceFacts::Classroom { owner_id, .. },
        ) => require_owner(identity, *owner_id),

        (
            Action::ViewSubmissions,
            ResourceFacts::Assignment {
                owner_id,
                is_member,
                ..
            },
        ) => classroom_access(identity, *owner_id, *is_member),

        (
            Action::SubmitAssignment,
            ResourceFacts::Assignment {
                is_member,
                due_date,
                ..
            },
        ) => {
            if !is_member {
                return Err(DenyReason::NotMember);
            }
            check_submission_window(*due_date, now)
        }

        (
            Action::UpdateSubmission | Action::DeleteSubmission,
            ResourceFacts::Submission {
                submitter_id,
                due_date,
                ..
            },
        ) => {
            if *submitter_id != identity.user_id {
                return Err(DenyReason::NotOwner);
            }
            check_submission_window(*due_date, now)
        }

        // Facts of the wrong shape for the action: a routing bug, never an allow
        _ => Err(DenyReason::UnknownResource),
    }
}

fn classroom_access(identity: &Identity, owner_id: Uuid, is_member: bool) -> Result<(), DenyReason> {
    match identity.role {
        Role::Professor => require_owner(identity, owner_id),
        Role::Student if is_member => Ok(()),
        Role::Student => Err(DenyReason::NotMember),
    }
}

fn require_owner(identity: &Identity, owner_id: Uuid) -> Result<(), DenyReason> {
    if identity.user_id == owner_id {
        Ok(())
    } else {
        Err(DenyReason::NotOwner)
    }
}
