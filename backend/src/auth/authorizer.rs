//! Resolves ownership facts and applies the policy
//!
//! Any failure while resolving facts closes the decision: the caller gets
//! `DependencyUnavailable`, never an allow.

use super::identity::Identity;
use super::policy::{self, Action, Decision, Resource, ResourceFacts};
use crate::error::ApiError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classroom_shared::{AuthError, Role};
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Facts about an assignment needed by the policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentFacts {
    pub classroom_id: Uuid,
    pub owner_id: Uuid,
    pub due_date: DateTime<Utc>,
}

/// Facts about a submission needed by the policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFacts {
    pub assignment_id: Uuid,
    pub classroom_id: Uuid,
    pub owner_id: Uuid,
    pub submitter_id: Uuid,
    pub due_date: DateTime<Utc>,
}

/// Read-only ownership queries answered by the persistence layer
#[async_trait]
pub trait OwnershipFacts: Send + Sync {
    /// Owning professor of a classroom, if it exists
    async fn classroom_owner(&self, classroom_id: Uuid) -> Result<Option<Uuid>>;

    async fn is_member(&self, classroom_id: Uuid, user_id: Uuid) -> Result<bool>;

    async fn assignment(&self, assignment_id: Uuid) -> Result<Option<AssignmentFacts>>;

    async fn submission(&self, submission_id: Uuid) -> Result<Option<SubmissionFacts>>;
}

/// Authorization entry point shared by all handlers
#[derive(Clone)]
pub struct Authorizer {
    facts: Arc<dyn OwnershipFacts>,
    expose_deny_reasons: bool,
}

impl Authorizer {
    pub fn new(facts: Arc<dyn OwnershipFacts>, expose_deny_reasons: bool) -> Self {
        Self {
            facts,
            expose_deny_reasons,
        }
    }

    /// Decide `action` on `resource` for `identity` at the current time
    #[inline]
    pub async fn authorize(
        &self,
        identity: Option<&Identity>,
        action: Action,
        resource: Resource,
    ) -> Result<Decision, AuthError> {
        self.authorize_at(identity, action, resource, Utc::now()).await
    }

    /// Decide as of `now`. `Err` only ever means `DependencyUnavailable`.
    pub async fn authorize_at(
        &self,
        identity: Option<&Identity>,
        action: Action,
        resource: Resource,
        now: DateTime<Utc>,
    ) -> Result<Decision, AuthError> {
        if action.is_public() {
            return Ok(Decision::Allow);
        }

        let identity = match policy::precheck(identity, action) {
            Ok(identity) => identity,
            Err(reason) => return Ok(Decision::Deny(reason)),
        };

        let facts = self.resolve(identity, resource).await.map_err(|e| {
            error!(error = %e, action = %action, "Ownership lookup failed; denying");
            AuthError::DependencyUnavailable
        })?;

        Ok(policy::decide(Some(identity), action, &facts, now))
    }

    /// Authorize and convert a denial into the HTTP error for handlers
    pub async fn require(
        &self,
        identity: &Identity,
        action: Action,
        resource: Resource,
    ) -> Result<(), ApiError> {
        match self.authorize(Some(identity), action, resource).await {
            Ok(Decision::Allow) => {
                debug!(user_id = %identity.user_id, action = %action, "Authorized");
                Ok(())
            }
            Ok(Decision::Deny(reason)) => {
                warn!(
                    user_id = %identity.user_id,
                    role = %identity.role,
                    action = %action,
                    ?resource,
                    ?reason,
                    "Authorization denied"
                );
                Err(ApiError::from_denial(reason.into(), self.expose_deny_reasons))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn resolve(&self, identity: &Identity, resource: Resource) -> Result<ResourceFacts> {
        let facts = match resource {
            Resource::None => ResourceFacts::None,
            Resource::Classroom(classroom_id) => {
                match self.facts.classroom_owner(classroom_id).await? {
                    None => ResourceFacts::Missing,
                    Some(owner_id) => ResourceFacts::Classroom {
                        owner_id,
                        is_member: self.membership(identity, classroom_id).await?,
                    },
                }
            }
            Resource::Assignment(assignment_id) => {
                match self.facts.assignment(assignment_id).await? {
                    None => ResourceFacts::Missing,
                    Some(assignment) => ResourceFacts::Assignment {
                        owner_id: assignment.owner_id,
                        is_member: self.membership(identity, assignment.classroom_id).await?,
                        due_date: assignment.due_date,
                    },
                }
            }
            Resource::Submission(submission_id) => {
                match self.facts.submission(submission_id).await? {
                    None => ResourceFacts::Missing,
                    Some(submission) => ResourceFacts::Submission {
                        owner_id: submission.owner_id,
                        submitter_id: submission.submitter_id,
                        due_date: submission.due_date,
                    },
                }
            }
        };
        Ok(facts)
    }

    /// Enrollment only matters for students; skip the query for professors
    async fn membership(&self, identity: &Identity, classroom_id: Uuid) -> Result<bool> {
        match identity.role {
            Role::Student => self.facts.is_member(classroom_id, identity.user_id).await,
            Role::Professor => Ok(false),
        }
    }
}
