//! Classroom, assignment and submission operations
//!
//! Every operation asks the [`Authorizer`] before touching storage. The
//! repositories below it assume the caller has already been cleared.

use crate::auth::{submission_scope, Action, Authorizer, Identity, Resource, SubmissionScope};
use crate::error::ApiError;
use crate::repositories::{
    AssignmentRepository, ClassroomRepository, CreateAssignment, CreateClassroom,
    SubmissionRepository,
};
use classroom_shared::validation::{validate_name, validate_title};
use classroom_shared::{
    Assignment, Classroom, ClassroomRoster, ClassroomStudentCount, CreateAssignmentRequest,
    CreateClassroomRequest, Role, StudentInfo, Submission,
};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

const CLASS_CODE_LEN: usize = 6;
const CLASS_CODE_ATTEMPTS: usize = 5;

/// Six uppercase hex characters taken from a random UUID
pub fn generate_class_code() -> String {
    Uuid::new_v4().simple().to_string()[..CLASS_CODE_LEN].to_uppercase()
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn validate_image(image_data: &str) -> Result<(), ApiError> {
    if image_data.trim().is_empty() {
        return Err(ApiError::validation("image_data", "Image data cannot be empty"));
    }
    Ok(())
}

/// Classroom operations
pub struct ClassroomService;

impl ClassroomService {
    /// Owned classrooms for professors, enrolled ones for students
    pub async fn list(pool: &PgPool, authz: &Authorizer, identity: &Identity) -> Result<Vec<Classroom>, ApiError> {
        authz.require(identity, Action::ListOwnClassrooms, Resource::None).await?;

        let records = match identity.role {
            Role::Professor => ClassroomRepository::list_owned(pool, identity.user_id).await?,
            Role::Student => ClassroomRepository::list_enrolled(pool, identity.user_id).await?,
        };

        Ok(records.into_iter().map(Classroom::from).collect())
    }

    pub async fn create(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        req: CreateClassroomRequest,
    ) -> Result<Classroom, ApiError> {
        authz.require(identity, Action::CreateClassroom, Resource::None).await?;
        validate_name(&req.name).map_err(|m| ApiError::validation("name", m))?;

        let mut class_code = generate_class_code();
        let mut attempts = 1;
        while ClassroomRepository::code_exists(pool, &class_code).await? {
            if attempts >= CLASS_CODE_ATTEMPTS {
                return Err(anyhow::anyhow!("Could not allocate a unique class code").into());
            }
            warn!(%class_code, "Class code collision; regenerating");
            class_code = generate_class_code();
            attempts += 1;
        }

        let record = ClassroomRepository::create(
            pool,
            CreateClassroom {
                name: req.name.trim().to_string(),
                description: req.description,
                class_code,
                professor_id: identity.user_id,
            },
        )
        .await?;

        info!(classroom_id = %record.id, professor_id = %identity.user_id, "Classroom created");
        Ok(record.into())
    }

    pub async fn get(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        classroom_id: Uuid,
    ) -> Result<Classroom, ApiError> {
        authz.require(identity, Action::ViewClassroom, Resource::Classroom(classroom_id)).await?;

        ClassroomRepository::find_by_id(pool, classroom_id)
            .await?
            .map(Classroom::from)
            .ok_or_else(|| ApiError::NotFound("Classroom not found".to_string()))
    }

    pub async fn delete(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        classroom_id: Uuid,
    ) -> Result<(), ApiError> {
        authz.require(identity, Action::DeleteClassroom, Resource::Classroom(classroom_id)).await?;

        if !ClassroomRepository::delete(pool, classroom_id).await? {
            return Err(ApiError::NotFound("Classroom not found".to_string()));
        }

        info!(%classroom_id, "Classroom deleted");
        Ok(())
    }

    /// Enroll the calling student using an invite code
    pub async fn join(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        code: &str,
    ) -> Result<Classroom, ApiError> {
        authz.require(identity, Action::JoinClassroom, Resource::None).await?;

        let record = ClassroomRepository::find_by_code(pool, &normalize_code(code))
            .await?
            .ok_or_else(|| ApiError::NotFound("Invalid class code".to_string()))?;

        if !ClassroomRepository::add_student(pool, record.id, identity.user_id).await? {
            return Err(ApiError::Conflict("Already enrolled in this classroom".to_string()));
        }

        info!(classroom_id = %record.id, student_id = %identity.user_id, "Student joined classroom");
        Ok(record.into())
    }

    pub async fn roster(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        classroom_id: Uuid,
    ) -> Result<ClassroomRoster, ApiError> {
        let classroom = Self::get(pool, authz, identity, classroom_id).await?;
        let students: Vec<StudentInfo> = ClassroomRepository::list_students(pool, classroom_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(ClassroomRoster {
            classroom_id,
            classroom_name: classroom.name,
            student_count: students.len(),
            students,
        })
    }

    pub async fn student_count(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        classroom_id: Uuid,
    ) -> Result<ClassroomStudentCount, ApiError> {
        let classroom = Self::get(pool, authz, identity, classroom_id).await?;
        let student_count = ClassroomRepository::count_students(pool, classroom_id).await?;

        Ok(ClassroomStudentCount {
            classroom_id,
            classroom_name: classroom.name,
            student_count,
        })
    }

    /// Enrollment counts across the caller's own classrooms
    pub async fn student_counts(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
    ) -> Result<Vec<ClassroomStudentCount>, ApiError> {
        authz.require(identity, Action::ListOwnClassrooms, Resource::None).await?;

        match identity.role {
            Role::Professor => Ok(ClassroomRepository::count_students_by_owner(pool, identity.user_id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect()),
            Role::Student => {
                let mut counts = Vec::new();
                for classroom in ClassroomRepository::list_enrolled(pool, identity.user_id).await? {
                    let student_count = ClassroomRepository::count_students(pool, classroom.id).await?;
                    counts.push(ClassroomStudentCount {
                        classroom_id: classroom.id,
                        classroom_name: classroom.name,
                        student_count,
                    });
                }
                Ok(counts)
            }
        }
    }
}

/// Assignment and submission operations
pub struct AssignmentService;

impl AssignmentService {
    pub async fn create(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        classroom_id: Uuid,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment, ApiError> {
        authz.require(identity, Action::CreateAssignment, Resource::Classroom(classroom_id)).await?;
        validate_title(&req.title).map_err(|m| ApiError::validation("title", m))?;

        let record = AssignmentRepository::create(
            pool,
            CreateAssignment {
                classroom_id,
                title: req.title.trim().to_string(),
                description: req.description,
                due_date: req.due_date,
            },
        )
        .await?;

        info!(assignment_id = %record.id, %classroom_id, "Assignment created");
        Ok(record.into())
    }

    pub async fn list_for_classroom(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        classroom_id: Uuid,
    ) -> Result<Vec<Assignment>, ApiError> {
        authz.require(identity, Action::ViewAssignments, Resource::Classroom(classroom_id)).await?;

        let records = AssignmentRepository::list_by_classroom(pool, classroom_id).await?;
        Ok(records.into_iter().map(Assignment::from).collect())
    }

    /// Assignments across every classroom the calling student is enrolled in
    pub async fn list_mine(pool: &PgPool, authz: &Authorizer, identity: &Identity) -> Result<Vec<Assignment>, ApiError> {
        authz.require(identity, Action::ListOwnSubmissions, Resource::None).await?;

        let records = AssignmentRepository::list_for_student(pool, identity.user_id).await?;
        Ok(records.into_iter().map(Assignment::from).collect())
    }

    pub async fn submit(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        assignment_id: Uuid,
        image_data: &str,
    ) -> Result<Submission, ApiError> {
        authz.require(identity, Action::SubmitAssignment, Resource::Assignment(assignment_id)).await?;
        validate_image(image_data)?;

        let record = SubmissionRepository::create(pool, assignment_id, identity.user_id, image_data)
            .await?
            .ok_or_else(|| ApiError::Conflict("Assignment already submitted".to_string()))?;

        info!(submission_id = %record.id, %assignment_id, student_id = %identity.user_id, "Assignment submitted");
        Ok(record.into())
    }

    /// All submissions for the owning professor; a student sees only their own
    pub async fn list_submissions(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        assignment_id: Uuid,
    ) -> Result<Vec<Submission>, ApiError> {
        authz.require(identity, Action::ViewSubmissions, Resource::Assignment(assignment_id)).await?;

        let records = match submission_scope(identity) {
            SubmissionScope::All => SubmissionRepository::list_by_assignment(pool, assignment_id).await?,
            SubmissionScope::OwnOnly(student_id) => {
                SubmissionRepository::list_by_assignment_and_student(pool, assignment_id, student_id).await?
            }
        };

        Ok(records.into_iter().map(Submission::from).collect())
    }

    pub async fn list_my_submissions(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
    ) -> Result<Vec<Submission>, ApiError> {
        authz.require(identity, Action::ListOwnSubmissions, Resource::None).await?;

        let records = SubmissionRepository::list_by_student(pool, identity.user_id).await?;
        Ok(records.into_iter().map(Submission::from).collect())
    }

    pub async fn update_submission(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        submission_id: Uuid,
        image_data: &str,
    ) -> Result<Submission, ApiError> {
        authz.require(identity, Action::UpdateSubmission, Resource::Submission(submission_id)).await?;
        validate_image(image_data)?;

        let record = SubmissionRepository::update_image(pool, submission_id, image_data)
            .await?
            .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

        info!(%submission_id, "Submission updated");
        Ok(record.into())
    }

    pub async fn delete_submission(
        pool: &PgPool,
        authz: &Authorizer,
        identity: &Identity,
        submission_id: Uuid,
    ) -> Result<(), ApiError> {
        authz.require(identity, Action::DeleteSubmission, Resource::Submission(submission_id)).await?;

        if !SubmissionRepository::delete(pool, submission_id).await? {
            return Err(ApiError::NotFound("Submission not found".to_string()));
        }

        info!(%submission_id, "Submission deleted");
        Ok(())
    }
}
