//! Ownership facts answered from Postgres

use crate::auth::{AssignmentFacts, OwnershipFacts, SubmissionFacts};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::classroom::ClassroomRepository;

#[derive(Debug, sqlx::FromRow)]
struct AssignmentFactsRow {
    classroom_id: Uuid,
    professor_id: Uuid,
    due_date: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct SubmissionFactsRow {
    assignment_id: Uuid,
    classroom_id: Uuid,
    professor_id: Uuid,
    student_id: Uuid,
    due_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PgOwnershipFacts {
    pool: PgPool,
}

impl PgOwnershipFacts {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnershipFacts for PgOwnershipFacts {
    async fn classroom_owner(&self, classroom_id: Uuid) -> Result<Option<Uuid>> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT professor_id FROM classrooms WHERE id = $1
            "#,
        )
        .bind(classroom_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    async fn is_member(&self, classroom_id: Uuid, user_id: Uuid) -> Result<bool> {
        ClassroomRepository::is_member(&self.pool, classroom_id, user_id).await
    }

    async fn assignment(&self, assignment_id: Uuid) -> Result<Option<AssignmentFacts>> {
        let row = sqlx::query_as::<_, AssignmentFactsRow>(
            r#"
            SELECT a.classroom_id, c.professor_id, a.due_date
            FROM assignments a
            JOIN classrooms c ON c.id = a.classroom_id
            WHERE a.id = $1
            "#,
        )
        .bind(assignment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| AssignmentFacts {
            classroom_id: r.classroom_id,
            owner_id: r.professor_id,
            due_date: r.due_date,
        }))
    }

    async fn submission(&self, submission_id: Uuid) -> Result<Option<SubmissionFacts>> {
        let row = sqlx::query_as::<_, SubmissionFactsRow>(
            r#"
            SELECT s.assignment_id, a.classroom_id, c.professor_id, s.student_id, a.due_date
            FROM assignment_submissions s
            JOIN assignments a ON a.id = s.assignment_id
            JOIN classrooms c ON c.id = a.classroom_id
            WHERE s.id = $1
            "#,
        )
        .bind(submission_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| SubmissionFacts {
            assignment_id: r.assignment_id,
            classroom_id: r.classroom_id,
            owner_id: r.professor_id,
            submitter_id: r.student_id,
            due_date: r.due_date,
        }))
    }
}
