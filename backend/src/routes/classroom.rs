//! Classroom, assignment and submission routes
//!
//! All mounted behind the authentication layer. Authorization happens in
//! the services, before any effect.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::{AssignmentService, ClassroomService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use classroom_shared::{
    Assignment, Classroom, ClassroomRoster, ClassroomStudentCount, CreateAssignmentRequest,
    CreateClassroomRequest, MessageResponse, Submission, SubmissionRequest,
};
use uuid::Uuid;

pub fn classroom_routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(list_classrooms))
        .route("/create", post(create_classroom))
        .route("/student-count", get(student_counts))
        .route("/my-assignments", get(my_assignments))
        .route("/my-submissions", get(my_submissions))
        .route("/join/:code", post(join_classroom))
        .route("/:id", get(get_classroom).delete(delete_classroom))
        .route("/:id/students", get(classroom_students))
        .route("/:id/student-count", get(classroom_student_count))
        .route("/:id/assignments", get(list_assignments).post(create_assignment))
        .route("/assignments/:assignment_id/submit", post(submit_assignment))
        .route("/assignments/:assignment_id/submissions", get(list_submissions))
        .route("/submissions/:submission_id", put(update_submission).delete(delete_submission))
}

async fn list_classrooms(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Classroom>>> {
    let classrooms = ClassroomService::list(state.db(), state.authorizer(), &user).await?;
    Ok(Json(classrooms))
}

async fn create_classroom(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateClassroomRequest>,
) -> ApiResult<(StatusCode, Json<Classroom>)> {
    let classroom = ClassroomService::create(state.db(), state.authorizer(), &user, req).await?;
    Ok((StatusCode::CREATED, Json(classroom)))
}

async fn get_classroom(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Classroom>> {
    let classroom = ClassroomService::get(state.db(), state.authorizer(), &user, id).await?;
    Ok(Json(classroom))
}

async fn delete_classroom(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    ClassroomService::delete(state.db(), state.authorizer(), &user, id).await?;
    Ok(Json(MessageResponse::new("Classroom deleted")))
}

async fn join_classroom(
    State(state): State<AppState>,
    user: AuthUser,
    Path(code): Path<String>,
) -> ApiResult<Json<Classroom>> {
    let classroom = ClassroomService::join(state.db(), state.authorizer(), &user, &code).await?;
    Ok(Json(classroom))
}

async fn classroom_students(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ClassroomRoster>> {
    let roster = ClassroomService::roster(state.db(), state.authorizer(), &user, id).await?;
    Ok(Json(roster))
}

async fn classroom_student_count(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ClassroomStudentCount>> {
    let count = ClassroomService::student_count(state.db(), state.authorizer(), &user, id).await?;
    Ok(Json(count))
}

async fn student_counts(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<ClassroomStudentCount>>> {
    let counts = ClassroomService::student_counts(state.db(), state.authorizer(), &user).await?;
    Ok(Json(counts))
}

async fn create_assignment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateAssignmentRequest>,
) -> ApiResult<(StatusCode, Json<Assignment>)> {
    let assignment = AssignmentService::create(state.db(), state.authorizer(), &user, id, req).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn list_assignments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Assignment>>> {
    let assignments = AssignmentService::list_for_classroom(state.db(), state.authorizer(), &user, id).await?;
    Ok(Json(assignments))
}

async fn my_assignments(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Assignment>>> {
    let assignments = AssignmentService::list_mine(state.db(), state.authorizer(), &user).await?;
    Ok(Json(assignments))
}

async fn submit_assignment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(assignment_id): Path<Uuid>,
    Json(req): Json<SubmissionRequest>,
) -> ApiResult<(StatusCode, Json<Submission>)> {
    let submission =
        AssignmentService::submit(state.db(), state.authorizer(), &user, assignment_id, &req.image_data).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

async fn list_submissions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(assignment_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Submission>>> {
    let submissions =
        AssignmentService::list_submissions(state.db(), state.authorizer(), &user, assignment_id).await?;
    Ok(Json(submissions))
}

async fn my_submissions(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Submission>>> {
    let submissions = AssignmentService::list_my_submissions(state.db(), state.authorizer(), &user).await?;
    Ok(Json(submissions))
}

async fn update_submission(
    State(state): State<AppState>,
    user: AuthUser,
    Path(submission_id): Path<Uuid>,
    Json(req): Json<SubmissionRequest>,
) -> ApiResult<Json<Submission>> {
    let submission = AssignmentService::update_submission(
        state.db(),
        state.authorizer(),
        &user,
        submission_id,
        &req.image_data,
    )
    .await?;
    Ok(Json(submission))
}

async fn delete_submission(
    State(state): State<AppState>,
    user: AuthUser,
    Path(submission_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    AssignmentService::delete_submission(state.db(), state.authorizer(), &user, submission_id).await?;
    Ok(Json(MessageResponse::new("Submission deleted")))
}
