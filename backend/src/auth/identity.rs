//! The authenticated principal of one request

use classroom_shared::Role;
use uuid::Uuid;

/// Identity established by the authentication gate.
///
/// Lives for one request; it is passed explicitly to authorization and never
/// cached across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub student_id: String,
    pub role: Role,
}

impl Identity {
    #[inline]
    pub fn is_professor(&self) -> bool {
        self.role == Role::Professor
    }

    #[inline]
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}
