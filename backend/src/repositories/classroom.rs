//! Classroom and enrollment repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use classroom_shared::{Classroom, ClassroomStudentCount, StudentInfo};
use sqlx::PgPool;
use uuid::Uuid;

/// Classroom record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClassroomRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub class_code: String,
    pub professor_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<ClassroomRecord> for Classroom {
    fn from(record: ClassroomRecord) -> Self {
        Classroom {
            id: record.id,
            name: record.name,
            description: record.description,
            class_code: record.class_code,
            professor_id: record.professor_id,
            created_at: record.created_at,
        }
    }
}

/// Roster row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentRecord {
    pub id: Uuid,
    pub student_id: String,
    pub name: String,
    pub email: String,
}

impl From<StudentRecord> for StudentInfo {
    fn from(record: StudentRecord) -> Self {
        StudentInfo {
            id: record.id,
            student_id: record.student_id,
            name: record.name,
            email: record.email,
        }
    }
}

/// Per-classroom enrollment count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentCountRecord {
    pub classroom_id: Uuid,
    pub classroom_name: String,
    pub student_count: i64,
}

impl From<StudentCountRecord> for ClassroomStudentCount {
    fn from(record: StudentCountRecord) -> Self {
        ClassroomStudentCount {
            classroom_id: record.classroom_id,
            classroom_name: record.classroom_name,
            student_count: record.student_count,
        }
    }
}

/// Input for creating a classroom
#[derive(Debug, Clone)]
pub struct CreateClassroom {
    pub name: String,
    pub description: Option<String>,
    pub class_code: String,
    pub professor_id: Uuid,
}

/// Classroom repository for database operations
pub struct ClassroomRepository;

impl ClassroomRepository {
    pub async fn create(pool: &PgPool, input: CreateClassroom) -> Result<ClassroomRecord> {
        let record = sqlx::query_as::<_, ClassroomRecord>(
            r#"
            INSERT INTO classrooms (name, description, class_code, professor_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, class_code, professor_id, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.class_code)
        .bind(input.professor_id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ClassroomRecord>> {
        let record = sqlx::query_as::<_, ClassroomRecord>(
            r#"
            SELECT id, name, description, class_code, professor_id, created_at
            FROM classrooms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn find_by_code(pool: &PgPool, class_code: &str) -> Result<Option<ClassroomRecord>> {
        let record = sqlx::query_as::<_, ClassroomRecord>(
            r#"
            SELECT id, name, description, class_code, professor_id, created_at
            FROM classrooms
            WHERE class_code = $1
            "#,
        )
        .bind(class_code)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn code_exists(pool: &PgPool, class_code: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM classrooms WHERE class_code = $1)
            "#,
        )
        .bind(class_code)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Classrooms a professor owns
    pub async fn list_owned(pool: &PgPool, professor_id: Uuid) -> Result<Vec<ClassroomRecord>> {
        let records = sqlx::query_as::<_, ClassroomRecord>(
            r#"
            SELECT id, name, description, class_code, professor_id, created_at
            FROM classrooms
            WHERE professor_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(professor_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Classrooms a student is enrolled in
    pub async fn list_enrolled(pool: &PgPool, student_id: Uuid) -> Result<Vec<ClassroomRecord>> {
        let records = sqlx::query_as::<_, ClassroomRecord>(
            r#"
            SELECT c.id, c.name, c.description, c.class_code, c.professor_id, c.created_at
            FROM classrooms c
            JOIN classroom_students cs ON cs.classroom_id = c.id
            WHERE cs.student_id = $1
            ORDER BY cs.joined_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Delete a classroom; enrollments, assignments and submissions cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM classrooms WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Enroll a student; returns false if already enrolled
    pub async fn add_student(pool: &PgPool, classroom_id: Uuid, student_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO classroom_students (classroom_id, student_id)
            VALUES ($1, $2)
            ON CONFLICT (classroom_id, student_id) DO NOTHING
            "#,
        )
        .bind(classroom_id)
        .bind(student_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_member(pool: &PgPool, classroom_id: Uuid, student_id: Uuid) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM classroom_students
                WHERE classroom_id = $1 AND student_id = $2
            )
            "#,
        )
        .bind(classroom_id)
        .bind(student_id)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    pub async fn list_students(pool: &PgPool, classroom_id: Uuid) -> Result<Vec<StudentRecord>> {
        let records = sqlx::query_as::<_, StudentRecord>(
            r#"
            SELECT u.id, u.student_id, u.name, u.email
            FROM users u
            JOIN classroom_students cs ON cs.student_id = u.id
            WHERE cs.classroom_id = $1
            ORDER BY u.name
            "#,
        )
        .bind(classroom_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn count_students(pool: &PgPool, classroom_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM classroom_students WHERE classroom_id = $1
            "#,
        )
        .bind(classroom_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Enrollment counts for every classroom a professor owns
    pub async fn count_students_by_owner(
        pool: &PgPool,
        professor_id: Uuid,
    ) -> Result<Vec<StudentCountRecord>> {
        let records = sqlx::query_as::<_, StudentCountRecord>(
            r#"
            SELECT c.id AS classroom_id, c.name AS classroom_name,
                   COUNT(cs.student_id) AS student_count
            FROM classrooms c
            LEFT JOIN classroom_students cs ON cs.classroom_id = c.id
            WHERE c.professor_id = $1
            GROUP BY c.id, c.name, c.created_at
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(professor_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    // Integration tests require database - marked with #[ignore]
    // Run with: cargo test --features integration -- --ignored
}
