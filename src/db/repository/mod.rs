//! Repository trait for the school diary store.
//!
//! The trait is the persistence gateway of the application: one queryable
//! collection per entity type with list / single-match get / add / update /
//! remove operations. Every mutating call executes as one atomic unit of
//! work — either all of its reference checks and writes apply, or none do.
//!
//! Single-match semantics: `get_*` returns the unique row with the given
//! id or fails with [`RepositoryError::NotFound`]; zero and ambiguous
//! matches are treated identically.

mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;

use super::models::{
    Grade, NewGrade, NewStudent, NewSubject, NewTeacher, Student, Subject, Teacher,
};

/// Persistence gateway for all four entity collections.
///
/// Relationship semantics:
/// - `add_student`/`update_student` re-parent the listed grades to the
///   student; update first releases every grade the student currently owns
///   (full replace, not a merge).
/// - `add_teacher`/`update_teacher` replace the teacher's subject
///   associations, preserving the supplied order; duplicate subject ids
///   collapse to a single association (first occurrence wins).
/// - `remove_student`/`remove_teacher`/`remove_subject` clear dependent
///   grade foreign keys (set-null on delete); `remove_subject` also drops
///   teacher↔subject associations.
///
/// Referenced ids that do not resolve fail the whole call with
/// [`RepositoryError::NotFound`] before any write becomes visible.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SchoolRepository: Send + Sync {
    // ==================== Subjects ====================

    /// Enumerate all subjects in ascending id order.
    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>>;

    /// Single-match lookup of a subject by id.
    async fn get_subject(&self, id: i32) -> RepositoryResult<Subject>;

    /// Add a subject, returning the freshly assigned id.
    async fn add_subject(&self, subject: NewSubject) -> RepositoryResult<i32>;

    /// Replace every mutable field of the subject with the given id.
    async fn update_subject(&self, id: i32, subject: NewSubject) -> RepositoryResult<()>;

    /// Remove the subject with the given id, clearing grade references and
    /// teacher associations that point at it.
    async fn remove_subject(&self, id: i32) -> RepositoryResult<()>;

    // ==================== Teachers ====================

    /// Enumerate all teachers in ascending id order.
    async fn list_teachers(&self) -> RepositoryResult<Vec<Teacher>>;

    /// Single-match lookup of a teacher by id.
    async fn get_teacher(&self, id: i32) -> RepositoryResult<Teacher>;

    /// Add a teacher with its subject associations, returning the assigned id.
    async fn add_teacher(&self, teacher: NewTeacher) -> RepositoryResult<i32>;

    /// Replace the teacher's fields and subject associations.
    async fn update_teacher(&self, id: i32, teacher: NewTeacher) -> RepositoryResult<()>;

    /// Remove the teacher with the given id, clearing grade references and
    /// its subject associations.
    async fn remove_teacher(&self, id: i32) -> RepositoryResult<()>;

    // ==================== Students ====================

    /// Enumerate all students in ascending id order.
    async fn list_students(&self) -> RepositoryResult<Vec<Student>>;

    /// Single-match lookup of a student by id.
    async fn get_student(&self, id: i32) -> RepositoryResult<Student>;

    /// Add a student and re-parent the listed grades to it, returning the
    /// assigned id.
    async fn add_student(&self, student: NewStudent) -> RepositoryResult<i32>;

    /// Replace the student's fields and owned grade set.
    async fn update_student(&self, id: i32, student: NewStudent) -> RepositoryResult<()>;

    /// Remove the student with the given id, releasing its grades.
    async fn remove_student(&self, id: i32) -> RepositoryResult<()>;

    // ==================== Grades ====================

    /// Enumerate all grades in ascending id order.
    async fn list_grades(&self) -> RepositoryResult<Vec<Grade>>;

    /// Single-match lookup of a grade by id.
    async fn get_grade(&self, id: i32) -> RepositoryResult<Grade>;

    /// Add a grade, returning the freshly assigned id.
    async fn add_grade(&self, grade: NewGrade) -> RepositoryResult<i32>;

    /// Replace every mutable field of the grade, including references.
    async fn update_grade(&self, id: i32, grade: NewGrade) -> RepositoryResult<()>;

    /// Remove the grade with the given id.
    async fn remove_grade(&self, id: i32) -> RepositoryResult<()>;

    // ==================== Health ====================

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
