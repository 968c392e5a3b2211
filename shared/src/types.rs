//! API request and response types

use crate::models::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Plain acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Issued access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub student_id: String,
    pub password: String,
}

/// Sign-up request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub student_id: String,
    #[serde(default)]
    pub department: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub role: Role,
}

/// Password change request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Create classroom request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassroomRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Student count for one classroom
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassroomStudentCount {
    pub classroom_id: Uuid,
    pub classroom_name: String,
    pub student_count: i64,
}

/// Roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentInfo {
    pub id: Uuid,
    pub student_id: String,
    pub name: String,
    pub email: String,
}

/// Classroom roster response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassroomRoster {
    pub classroom_id: Uuid,
    pub classroom_name: String,
    pub student_count: usize,
    pub students: Vec<StudentInfo>,
}

/// Create assignment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssignmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
}

/// Submit or update a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub image_data: String,
}
