//! HTTP handlers for the REST API.
//!
//! Each entity gets the same five operations: list (Min DTOs), create,
//! read, update (total replace), delete. Create and update resolve every
//! relationship id against the target collection before mutating anything,
//! so a bad reference fails the whole request with 404 and no row is
//! touched; the repository re-checks inside its own transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    GradeDto, GradeMinDto, HealthResponse, StudentDto, StudentMinDto, SubjectDto, SubjectMinDto,
    TeacherDto, TeacherMinDto,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::{RepositoryError, SchoolRepository};

/// Result type for handlers returning a JSON body.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for write handlers returning only a status code.
pub type StatusResult = Result<StatusCode, AppError>;

/// Map a failed reference lookup into the API's bad-reference condition.
fn reference_failure(entity: &'static str, id: i32, err: RepositoryError) -> AppError {
    if err.is_not_found() {
        AppError::NotFound(format!("referenced {} {} does not exist", entity, id))
    } else {
        AppError::Repository(err)
    }
}

async fn ensure_subjects_exist(
    repo: &dyn SchoolRepository,
    ids: &[i32],
) -> Result<(), AppError> {
    for &id in ids {
        repo.get_subject(id)
            .await
            .map_err(|e| reference_failure("subject", id, e))?;
    }
    Ok(())
}

async fn ensure_grades_exist(repo: &dyn SchoolRepository, ids: &[i32]) -> Result<(), AppError> {
    for &id in ids {
        repo.get_grade(id)
            .await
            .map_err(|e| reference_failure("grade", id, e))?;
    }
    Ok(())
}

/// Resolve a grade DTO's optional references, failing before any mutation.
async fn ensure_grade_refs_exist(
    repo: &dyn SchoolRepository,
    dto: &GradeDto,
) -> Result<(), AppError> {
    if let Some(id) = dto.student_id {
        repo.get_student(id)
            .await
            .map_err(|e| reference_failure("student", id, e))?;
    }
    if let Some(id) = dto.teacher_id {
        repo.get_teacher(id)
            .await
            .map_err(|e| reference_failure("teacher", id, e))?;
    }
    if let Some(id) = dto.subject_id {
        repo.get_subject(id)
            .await
            .map_err(|e| reference_failure("subject", id, e))?;
    }
    Ok(())
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Verify the service is running and the backing store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database,
    }))
}

// =============================================================================
// Subjects
// =============================================================================

/// GET /subjects
pub async fn list_subjects(State(state): State<AppState>) -> HandlerResult<Vec<SubjectMinDto>> {
    let subjects = state.repository.list_subjects().await?;
    Ok(Json(subjects.iter().map(SubjectMinDto::from).collect()))
}

/// POST /subjects
pub async fn create_subject(
    State(state): State<AppState>,
    Json(dto): Json<SubjectDto>,
) -> StatusResult {
    state.repository.add_subject(dto.into_new_subject()).await?;
    Ok(StatusCode::CREATED)
}

/// GET /subjects/{id}
pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> HandlerResult<SubjectDto> {
    let subject = state.repository.get_subject(id).await?;
    Ok(Json(SubjectDto::from(&subject)))
}

/// PUT /subjects/{id}
pub async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(dto): Json<SubjectDto>,
) -> StatusResult {
    state
        .repository
        .update_subject(id, dto.into_new_subject())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /subjects/{id}
pub async fn delete_subject(State(state): State<AppState>, Path(id): Path<i32>) -> StatusResult {
    state.repository.remove_subject(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Teachers
// =============================================================================

/// GET /teachers
pub async fn list_teachers(State(state): State<AppState>) -> HandlerResult<Vec<TeacherMinDto>> {
    let teachers = state.repository.list_teachers().await?;
    Ok(Json(teachers.iter().map(TeacherMinDto::from).collect()))
}

/// POST /teachers
pub async fn create_teacher(
    State(state): State<AppState>,
    Json(dto): Json<TeacherDto>,
) -> StatusResult {
    ensure_subjects_exist(state.repository.as_ref(), &dto.subjects_ids).await?;
    state.repository.add_teacher(dto.into_new_teacher()).await?;
    Ok(StatusCode::CREATED)
}

/// GET /teachers/{id}
pub async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> HandlerResult<TeacherDto> {
    let teacher = state.repository.get_teacher(id).await?;
    Ok(Json(TeacherDto::from(&teacher)))
}

/// PUT /teachers/{id}
pub async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(dto): Json<TeacherDto>,
) -> StatusResult {
    ensure_subjects_exist(state.repository.as_ref(), &dto.subjects_ids).await?;
    state
        .repository
        .update_teacher(id, dto.into_new_teacher())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /teachers/{id}
pub async fn delete_teacher(State(state): State<AppState>, Path(id): Path<i32>) -> StatusResult {
    state.repository.remove_teacher(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Students
// =============================================================================

/// GET /students
pub async fn list_students(State(state): State<AppState>) -> HandlerResult<Vec<StudentMinDto>> {
    let students = state.repository.list_students().await?;
    Ok(Json(students.iter().map(StudentMinDto::from).collect()))
}

/// POST /students
pub async fn create_student(
    State(state): State<AppState>,
    Json(dto): Json<StudentDto>,
) -> StatusResult {
    ensure_grades_exist(state.repository.as_ref(), &dto.grades_ids).await?;
    state.repository.add_student(dto.into_new_student()).await?;
    Ok(StatusCode::CREATED)
}

/// GET /students/{id}
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> HandlerResult<StudentDto> {
    let student = state.repository.get_student(id).await?;
    Ok(Json(StudentDto::from(&student)))
}

/// PUT /students/{id}
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(dto): Json<StudentDto>,
) -> StatusResult {
    ensure_grades_exist(state.repository.as_ref(), &dto.grades_ids).await?;
    state
        .repository
        .update_student(id, dto.into_new_student())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /students/{id}
pub async fn delete_student(State(state): State<AppState>, Path(id): Path<i32>) -> StatusResult {
    state.repository.remove_student(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Grades
// =============================================================================

/// GET /grades
pub async fn list_grades(State(state): State<AppState>) -> HandlerResult<Vec<GradeMinDto>> {
    let grades = state.repository.list_grades().await?;
    Ok(Json(grades.iter().map(GradeMinDto::from).collect()))
}

/// POST /grades
pub async fn create_grade(State(state): State<AppState>, Json(dto): Json<GradeDto>) -> StatusResult {
    ensure_grade_refs_exist(state.repository.as_ref(), &dto).await?;
    state.repository.add_grade(dto.into_new_grade()).await?;
    Ok(StatusCode::CREATED)
}

/// GET /grades/{id}
pub async fn get_grade(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> HandlerResult<GradeDto> {
    let grade = state.repository.get_grade(id).await?;
    Ok(Json(GradeDto::from(&grade)))
}

/// PUT /grades/{id}
pub async fn update_grade(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(dto): Json<GradeDto>,
) -> StatusResult {
    ensure_grade_refs_exist(state.repository.as_ref(), &dto).await?;
    state.repository.update_grade(id, dto.into_new_grade()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /grades/{id}
pub async fn delete_grade(State(state): State<AppState>, Path(id): Path<i32>) -> StatusResult {
    state.repository.remove_grade(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
