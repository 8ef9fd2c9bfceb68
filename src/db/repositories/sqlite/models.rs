//! Row structs mapping the SQLite schema to the domain model.

use diesel::prelude::*;

use super::schema::{grades, students, subjects, teacher_subjects, teachers};
use crate::db::models::{Grade, Student, Subject, Teacher};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subjects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SubjectRow {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl From<SubjectRow> for Subject {
    fn from(row: SubjectRow) -> Self {
        Subject {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = subjects)]
pub struct NewSubjectRow {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = teachers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TeacherRow {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub phone: String,
}

impl TeacherRow {
    /// Attach the ordered subject ids loaded from the join table.
    pub fn into_teacher(self, subjects_ids: Vec<i32>) -> Teacher {
        Teacher {
            id: self.id,
            last_name: self.last_name,
            first_name: self.first_name,
            middle_name: self.middle_name,
            phone: self.phone,
            subjects_ids,
        }
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = teachers)]
pub struct NewTeacherRow {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StudentRow {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
}

impl StudentRow {
    /// Attach the grade ids whose foreign key points at this student.
    pub fn into_student(self, grades_ids: Vec<i32>) -> Student {
        Student {
            id: self.id,
            last_name: self.last_name,
            first_name: self.first_name,
            middle_name: self.middle_name,
            grades_ids,
        }
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = students)]
pub struct NewStudentRow {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = grades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GradeRow {
    pub id: i32,
    pub value: i32,
    pub student_id: Option<i32>,
    pub teacher_id: Option<i32>,
    pub subject_id: Option<i32>,
}

impl From<GradeRow> for Grade {
    fn from(row: GradeRow) -> Self {
        Grade {
            id: row.id,
            value: row.value,
            student_id: row.student_id,
            teacher_id: row.teacher_id,
            subject_id: row.subject_id,
        }
    }
}

/// Insert/update record for grades. `treat_none_as_null` makes an update a
/// total replace: an absent reference overwrites the column with NULL.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = grades)]
#[diesel(treat_none_as_null = true)]
pub struct NewGradeRow {
    pub value: i32,
    pub student_id: Option<i32>,
    pub teacher_id: Option<i32>,
    pub subject_id: Option<i32>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = teacher_subjects)]
pub struct TeacherSubjectRow {
    pub teacher_id: i32,
    pub subject_id: i32,
    pub position: i32,
}
