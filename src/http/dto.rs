//! Data Transfer Objects for the HTTP API, and the entity→DTO projections.
//!
//! Full DTOs carry no id: they double as create/update payloads, and reads
//! return them for an id the caller already holds. Min DTOs are the list
//! representation and include the id so rows are addressable. Relationships
//! appear as plain identifiers, never as nested objects.
//!
//! Projections are hand-written pure functions (`From` impls); nothing here
//! validates or defaults beyond serde's handling of omitted fields, which
//! deserialize as empty/absent so that updates are total replaces.

use serde::{Deserialize, Serialize};

use crate::db::models::{
    Grade, NewGrade, NewStudent, NewSubject, NewTeacher, Student, Subject, Teacher,
};

// =============================================================================
// Subjects
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMinDto {
    pub id: i32,
    pub name: String,
}

impl From<&Subject> for SubjectDto {
    fn from(subject: &Subject) -> Self {
        Self {
            name: subject.name.clone(),
            description: subject.description.clone(),
        }
    }
}

impl From<&Subject> for SubjectMinDto {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name.clone(),
        }
    }
}

impl SubjectDto {
    pub fn into_new_subject(self) -> NewSubject {
        NewSubject {
            name: self.name,
            description: self.description,
        }
    }
}

// =============================================================================
// Teachers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDto {
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subjects_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherMinDto {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub phone: String,
}

impl From<&Teacher> for TeacherDto {
    fn from(teacher: &Teacher) -> Self {
        Self {
            last_name: teacher.last_name.clone(),
            first_name: teacher.first_name.clone(),
            middle_name: teacher.middle_name.clone(),
            phone: teacher.phone.clone(),
            subjects_ids: teacher.subjects_ids.clone(),
        }
    }
}

impl From<&Teacher> for TeacherMinDto {
    fn from(teacher: &Teacher) -> Self {
        Self {
            id: teacher.id,
            last_name: teacher.last_name.clone(),
            first_name: teacher.first_name.clone(),
            middle_name: teacher.middle_name.clone(),
            phone: teacher.phone.clone(),
        }
    }
}

impl TeacherDto {
    pub fn into_new_teacher(self) -> NewTeacher {
        NewTeacher {
            last_name: self.last_name,
            first_name: self.first_name,
            middle_name: self.middle_name,
            phone: self.phone,
            subjects_ids: self.subjects_ids,
        }
    }
}

// =============================================================================
// Students
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub grades_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMinDto {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
}

impl From<&Student> for StudentDto {
    fn from(student: &Student) -> Self {
        Self {
            last_name: student.last_name.clone(),
            first_name: student.first_name.clone(),
            middle_name: student.middle_name.clone(),
            grades_ids: student.grades_ids.clone(),
        }
    }
}

impl From<&Student> for StudentMinDto {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            last_name: student.last_name.clone(),
            first_name: student.first_name.clone(),
            middle_name: student.middle_name.clone(),
        }
    }
}

impl StudentDto {
    pub fn into_new_student(self) -> NewStudent {
        NewStudent {
            last_name: self.last_name,
            first_name: self.first_name,
            middle_name: self.middle_name,
            grades_ids: self.grades_ids,
        }
    }
}

// =============================================================================
// Grades
// =============================================================================

/// A grade's references are optional: an absent id stores an absent
/// relationship, and deleting a referent clears the stored id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeDto {
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub student_id: Option<i32>,
    #[serde(default)]
    pub teacher_id: Option<i32>,
    #[serde(default)]
    pub subject_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeMinDto {
    pub id: i32,
    pub value: i32,
}

impl From<&Grade> for GradeDto {
    fn from(grade: &Grade) -> Self {
        Self {
            value: grade.value,
            student_id: grade.student_id,
            teacher_id: grade.teacher_id,
            subject_id: grade.subject_id,
        }
    }
}

impl From<&Grade> for GradeMinDto {
    fn from(grade: &Grade) -> Self {
        Self {
            id: grade.id,
            value: grade.value,
        }
    }
}

impl GradeDto {
    pub fn into_new_grade(self) -> NewGrade {
        NewGrade {
            value: self.value,
            student_id: self.student_id,
            teacher_id: self.teacher_id,
            subject_id: self.subject_id,
        }
    }
}

// =============================================================================
// Health
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Status of the backing store
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_projection_copies_value_and_reference_ids() {
        let grade = Grade {
            id: 9,
            value: 5,
            student_id: Some(1),
            teacher_id: None,
            subject_id: Some(3),
        };
        let dto = GradeDto::from(&grade);
        assert_eq!(dto.value, 5);
        assert_eq!(dto.student_id, Some(1));
        assert_eq!(dto.teacher_id, None);
        assert_eq!(dto.subject_id, Some(3));

        let min = GradeMinDto::from(&grade);
        assert_eq!((min.id, min.value), (9, 5));
    }

    #[test]
    fn student_projection_preserves_grade_order() {
        let student = Student {
            id: 4,
            last_name: "Ivanova".into(),
            first_name: "Anna".into(),
            middle_name: "Petrovna".into(),
            grades_ids: vec![3, 7, 11],
        };
        let dto = StudentDto::from(&student);
        assert_eq!(dto.grades_ids, vec![3, 7, 11]);
    }

    #[test]
    fn grade_dto_fields_default_to_absent() {
        let dto: GradeDto = serde_json::from_str(r#"{"value": 4}"#).unwrap();
        assert_eq!(dto.student_id, None);
        assert_eq!(dto.teacher_id, None);
        assert_eq!(dto.subject_id, None);
    }

    #[test]
    fn dto_json_uses_camel_case_names() {
        let dto = TeacherDto {
            last_name: "Smith".into(),
            first_name: "John".into(),
            middle_name: String::new(),
            phone: "555-0101".into(),
            subjects_ids: vec![2],
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("lastName").is_some());
        assert!(json.get("subjectsIds").is_some());
        assert!(json.get("last_name").is_none());
    }

    #[test]
    fn omitted_list_field_deserializes_empty() {
        let dto: StudentDto =
            serde_json::from_str(r#"{"lastName":"Lee","firstName":"Sam","middleName":""}"#)
                .unwrap();
        assert!(dto.grades_ids.is_empty());
    }
}
