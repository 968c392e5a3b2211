//! Assignment and submission repositories

use anyhow::Result;
use chrono::{DateTime, Utc};
use classroom_shared::{Assignment, Submission};
use sqlx::PgPool;
use uuid::Uuid;

/// Assignment record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssignmentRecord {
    pub id: Uuid,
    pub classroom_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<AssignmentRecord> for Assignment {
    fn from(record: AssignmentRecord) -> Self {
        Assignment {
            id: record.id,
            classroom_id: record.classroom_id,
            title: record.title,
            description: record.description,
            due_date: record.due_date,
            created_at: record.created_at,
        }
    }
}

/// Submission record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    pub image_data: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl From<SubmissionRecord> for Submission {
    fn from(record: SubmissionRecord) -> Self {
        Submission {
            id: record.id,
            assignment_id: record.assignment_id,
            student_id: record.student_id,
            image_data: record.image_data,
            submitted_at: record.submitted_at,
        }
    }
}

/// Input for creating an assignment
#[derive(Debug, Clone)]
pub struct CreateAssignment {
    pub classroom_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
}

/// Assignment repository for database operations
pub struct AssignmentRepository;

impl AssignmentRepository {
    pub async fn create(pool: &PgPool, input: CreateAssignment) -> Result<AssignmentRecord> {
        let record = sqlx::query_as::<_, AssignmentRecord>(
            r#"
            INSERT INTO assignments (classroom_id, title, description, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, classroom_id, title, description, due_date, created_at
            "#,
        )
        .bind(input.classroom_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.due_date)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AssignmentRecord>> {
        let record = sqlx::query_as::<_, AssignmentRecord>(
            r#"
            SELECT id, classroom_id, title, description, due_date, created_at
            FROM assignments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn list_by_classroom(pool: &PgPool, classroom_id: Uuid) -> Result<Vec<AssignmentRecord>> {
        let records = sqlx::query_as::<_, AssignmentRecord>(
            r#"
            SELECT id, classroom_id, title, description, due_date, created_at
            FROM assignments
            WHERE classroom_id = $1
            ORDER BY due_date ASC
            "#,
        )
        .bind(classroom_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Assignments across every classroom a student is enrolled in
    pub async fn list_for_student(pool: &PgPool, student_id: Uuid) -> Result<Vec<AssignmentRecord>> {
        let records = sqlx::query_as::<_, AssignmentRecord>(
            r#"
            SELECT a.id, a.classroom_id, a.title, a.description, a.due_date, a.created_at
            FROM assignments a
            JOIN classroom_students cs ON cs.classroom_id = a.classroom_id
            WHERE cs.student_id = $1
            ORDER BY a.due_date ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}

/// Submission repository for database operations
pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Insert a submission; `None` if the student already submitted
    pub async fn create(
        pool: &PgPool,
        assignment_id: Uuid,
        student_id: Uuid,
        image_data: &str,
    ) -> Result<Option<SubmissionRecord>> {
        let record = sqlx::query_as::<_, SubmissionRecord>(
            r#"
            INSERT INTO assignment_submissions (assignment_id, student_id, image_data)
            VALUES ($1, $2, $3)
            ON CONFLICT (assignment_id, student_id) DO NOTHING
            RETURNING id, assignment_id, student_id, image_data, submitted_at
            "#,
        )
        .bind(assignment_id)
        .bind(student_id)
        .bind(image_data)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<SubmissionRecord>> {
        let record = sqlx::query_as::<_, SubmissionRecord>(
            r#"
            SELECT id, assignment_id, student_id, image_data, submitted_at
            FROM assignment_submissions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn list_by_assignment(pool: &PgPool, assignment_id: Uuid) -> Result<Vec<SubmissionRecord>> {
        let records = sqlx::query_as::<_, SubmissionRecord>(
            r#"
            SELECT id, assignment_id, student_id, image_data, submitted_at
            FROM assignment_submissions
            WHERE assignment_id = $1
            ORDER BY submitted_at ASC
            "#,
        )
        .bind(assignment_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn list_by_assignment_and_student(
        pool: &PgPool,
        assignment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Vec<SubmissionRecord>> {
        let records = sqlx::query_as::<_, SubmissionRecord>(
            r#"
            SELECT id, assignment_id, student_id, image_data, submitted_at
            FROM assignment_submissions
            WHERE assignment_id = $1 AND student_id = $2
            "#,
        )
        .bind(assignment_id)
        .bind(student_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn list_by_student(pool: &PgPool, student_id: Uuid) -> Result<Vec<SubmissionRecord>> {
        let records = sqlx::query_as::<_, SubmissionRecord>(
            r#"
            SELECT id, assignment_id, student_id, image_data, submitted_at
            FROM assignment_submissions
            WHERE student_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Replace the submitted image and stamp a new submission time
    pub async fn update_image(
        pool: &PgPool,
        id: Uuid,
        image_data: &str,
    ) -> Result<Option<SubmissionRecord>> {
        let record = sqlx::query_as::<_, SubmissionRecord>(
            r#"
            UPDATE assignment_submissions
            SET image_data = $2, submitted_at = NOW()
            WHERE id = $1
            RETURNING id, assignment_id, student_id, image_data, submitted_at
            "#,
        )
        .bind(id)
        .bind(image_data)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM assignment_submissions WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
