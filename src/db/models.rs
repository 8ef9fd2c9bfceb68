//! Domain model for the school diary.
//!
//! Entities carry their relationships as plain identifiers so that the
//! HTTP layer can project them into DTOs without touching the store:
//! a teacher owns an ordered set of subject ids, a grade references its
//! student/teacher/subject by nullable foreign key, and a student's grade
//! ids are derived by the repository from the grades that point at it.
//!
//! The `New*` records are the write-side counterparts: everything an
//! add/update operation replaces, minus the id.

use serde::{Deserialize, Serialize};

/// A subject taught at the school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i32,
    pub name: String,
    pub description: String,
}

/// Write record for [`Subject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
    pub name: String,
    pub description: String,
}

/// A teacher, owning a many-to-many set of subjects.
///
/// `subjects_ids` preserves the order the associations were supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub phone: String,
    pub subjects_ids: Vec<i32>,
}

/// Write record for [`Teacher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeacher {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub phone: String,
    pub subjects_ids: Vec<i32>,
}

/// A student. `grades_ids` lists the grades whose `student_id` points at
/// this student, in ascending grade-id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub grades_ids: Vec<i32>,
}

/// Write record for [`Student`]. The listed grades are re-parented to the
/// student as part of the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub grades_ids: Vec<i32>,
}

/// A grade. All three references are optional: deleting the referenced
/// row clears the foreign key rather than cascading into the grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: i32,
    pub value: i32,
    pub student_id: Option<i32>,
    pub teacher_id: Option<i32>,
    pub subject_id: Option<i32>,
}

/// Write record for [`Grade`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGrade {
    pub value: i32,
    pub student_id: Option<i32>,
    pub teacher_id: Option<i32>,
    pub subject_id: Option<i32>,
}
