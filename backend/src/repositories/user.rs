//! User repository for database operations

use crate::auth::UserDirectory;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classroom_shared::{Role, User};
use sqlx::PgPool;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub student_id: String,
    pub department: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Public view, without the password hash
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            student_id: self.student_id,
            department: self.department,
            email: self.email,
            phone_number: self.phone_number,
            role: self.role,
            created_at: self.created_at,
        }
    }

    #[cfg(test)]
    pub fn for_test(id: Uuid, student_id: &str, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: format!("User {}", student_id),
            student_id: student_id.to_string(),
            department: None,
            email: format!("{}@example.edu", student_id),
            password_hash: String::new(),
            phone_number: None,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub student_id: String,
    pub department: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub role: Role,
}

const USER_COLUMNS: &str = "id, name, student_id, department, email, password_hash, phone_number, role, created_at, updated_at";

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    pub async fn create(pool: &PgPool, input: CreateUser) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (name, student_id, department, email, password_hash, phone_number, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.student_id)
        .bind(&input.department)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.phone_number)
        .bind(input.role.as_str())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by student id (the login identifier)
    pub async fn find_by_student_id(pool: &PgPool, student_id: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE student_id = $1
            "#
        ))
        .bind(student_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replace the stored password hash
    pub async fn update_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check if email exists
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Check if student id exists
    pub async fn student_id_exists(pool: &PgPool, student_id: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE student_id = $1)
            "#,
        )
        .bind(student_id)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }
}

/// [`UserDirectory`] backed by the users table
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        UserRepository::find_by_id(&self.pool, id).await
    }

    async fn find_by_student_id(&self, student_id: &str) -> Result<Option<UserRecord>> {
        UserRepository::find_by_student_id(&self.pool, student_id).await
    }
}
