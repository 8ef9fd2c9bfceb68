//! In-memory repository implementation.
//!
//! `LocalRepository` keeps all four collections in `BTreeMap`s behind a
//! single mutex, so every repository call is trivially atomic and
//! enumeration order is ascending id. It backs unit and integration tests
//! and local development without a database file.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::db::models::{
    Grade, NewGrade, NewStudent, NewSubject, NewTeacher, Student, Subject, Teacher,
};
use crate::db::repository::{RepositoryError, RepositoryResult, SchoolRepository};

#[derive(Debug, Clone)]
struct SubjectRecord {
    name: String,
    description: String,
}

#[derive(Debug, Clone)]
struct TeacherRecord {
    last_name: String,
    first_name: String,
    middle_name: String,
    phone: String,
    subjects_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
struct StudentRecord {
    last_name: String,
    first_name: String,
    middle_name: String,
}

#[derive(Debug, Clone)]
struct GradeRecord {
    value: i32,
    student_id: Option<i32>,
    teacher_id: Option<i32>,
    subject_id: Option<i32>,
}

#[derive(Debug, Default)]
struct Store {
    subjects: BTreeMap<i32, SubjectRecord>,
    teachers: BTreeMap<i32, TeacherRecord>,
    students: BTreeMap<i32, StudentRecord>,
    grades: BTreeMap<i32, GradeRecord>,
    next_subject_id: i32,
    next_teacher_id: i32,
    next_student_id: i32,
    next_grade_id: i32,
}

impl Store {
    /// Grade ids owned by the student, in ascending grade-id order.
    fn grades_of(&self, student_id: i32) -> Vec<i32> {
        self.grades
            .iter()
            .filter(|(_, g)| g.student_id == Some(student_id))
            .map(|(&id, _)| id)
            .collect()
    }

    fn check_subject(&self, id: i32) -> RepositoryResult<()> {
        if self.subjects.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::no_such_entity("subject", id))
        }
    }

    fn check_teacher(&self, id: i32) -> RepositoryResult<()> {
        if self.teachers.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::no_such_entity("teacher", id))
        }
    }

    fn check_student(&self, id: i32) -> RepositoryResult<()> {
        if self.students.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::no_such_entity("student", id))
        }
    }

    fn check_grade(&self, id: i32) -> RepositoryResult<()> {
        if self.grades.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::no_such_entity("grade", id))
        }
    }

    /// Reference checks for a grade write, before any mutation.
    fn check_grade_refs(&self, grade: &NewGrade) -> RepositoryResult<()> {
        if let Some(id) = grade.student_id {
            self.check_student(id)?;
        }
        if let Some(id) = grade.teacher_id {
            self.check_teacher(id)?;
        }
        if let Some(id) = grade.subject_id {
            self.check_subject(id)?;
        }
        Ok(())
    }
}

/// Collapse duplicate subject ids to one association, first occurrence wins.
fn dedupe_subjects(ids: Vec<i32>) -> Vec<i32> {
    let mut seen = BTreeSet::new();
    ids.into_iter().filter(|&id| seen.insert(id)).collect()
}

/// In-memory implementation of [`SchoolRepository`].
#[derive(Debug, Default)]
pub struct LocalRepository {
    store: Mutex<Store>,
}

impl LocalRepository {
    /// Create an empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchoolRepository for LocalRepository {
    // ==================== Subjects ====================

    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>> {
        let store = self.store.lock();
        Ok(store
            .subjects
            .iter()
            .map(|(&id, s)| Subject {
                id,
                name: s.name.clone(),
                description: s.description.clone(),
            })
            .collect())
    }

    async fn get_subject(&self, id: i32) -> RepositoryResult<Subject> {
        let store = self.store.lock();
        let record = store
            .subjects
            .get(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("subject", id))?;
        Ok(Subject {
            id,
            name: record.name.clone(),
            description: record.description.clone(),
        })
    }

    async fn add_subject(&self, subject: NewSubject) -> RepositoryResult<i32> {
        let mut store = self.store.lock();
        store.next_subject_id += 1;
        let id = store.next_subject_id;
        store.subjects.insert(
            id,
            SubjectRecord {
                name: subject.name,
                description: subject.description,
            },
        );
        Ok(id)
    }

    async fn update_subject(&self, id: i32, subject: NewSubject) -> RepositoryResult<()> {
        let mut store = self.store.lock();
        let record = store
            .subjects
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("subject", id))?;
        record.name = subject.name;
        record.description = subject.description;
        Ok(())
    }

    async fn remove_subject(&self, id: i32) -> RepositoryResult<()> {
        let mut store = self.store.lock();
        store
            .subjects
            .remove(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("subject", id))?;
        // Set-null on delete: clear grade references and drop associations.
        for grade in store.grades.values_mut() {
            if grade.subject_id == Some(id) {
                grade.subject_id = None;
            }
        }
        for teacher in store.teachers.values_mut() {
            teacher.subjects_ids.retain(|&sid| sid != id);
        }
        Ok(())
    }

    // ==================== Teachers ====================

    async fn list_teachers(&self) -> RepositoryResult<Vec<Teacher>> {
        let store = self.store.lock();
        Ok(store
            .teachers
            .iter()
            .map(|(&id, t)| Teacher {
                id,
                last_name: t.last_name.clone(),
                first_name: t.first_name.clone(),
                middle_name: t.middle_name.clone(),
                phone: t.phone.clone(),
                subjects_ids: t.subjects_ids.clone(),
            })
            .collect())
    }

    async fn get_teacher(&self, id: i32) -> RepositoryResult<Teacher> {
        let store = self.store.lock();
        let record = store
            .teachers
            .get(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("teacher", id))?;
        Ok(Teacher {
            id,
            last_name: record.last_name.clone(),
            first_name: record.first_name.clone(),
            middle_name: record.middle_name.clone(),
            phone: record.phone.clone(),
            subjects_ids: record.subjects_ids.clone(),
        })
    }

    async fn add_teacher(&self, teacher: NewTeacher) -> RepositoryResult<i32> {
        let mut store = self.store.lock();
        for &sid in &teacher.subjects_ids {
            store.check_subject(sid)?;
        }
        store.next_teacher_id += 1;
        let id = store.next_teacher_id;
        store.teachers.insert(
            id,
            TeacherRecord {
                last_name: teacher.last_name,
                first_name: teacher.first_name,
                middle_name: teacher.middle_name,
                phone: teacher.phone,
                subjects_ids: dedupe_subjects(teacher.subjects_ids),
            },
        );
        Ok(id)
    }

    async fn update_teacher(&self, id: i32, teacher: NewTeacher) -> RepositoryResult<()> {
        let mut store = self.store.lock();
        store.check_teacher(id)?;
        for &sid in &teacher.subjects_ids {
            store.check_subject(sid)?;
        }
        let record = store
            .teachers
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("teacher", id))?;
        record.last_name = teacher.last_name;
        record.first_name = teacher.first_name;
        record.middle_name = teacher.middle_name;
        record.phone = teacher.phone;
        record.subjects_ids = dedupe_subjects(teacher.subjects_ids);
        Ok(())
    }

    async fn remove_teacher(&self, id: i32) -> RepositoryResult<()> {
        let mut store = self.store.lock();
        store
            .teachers
            .remove(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("teacher", id))?;
        for grade in store.grades.values_mut() {
            if grade.teacher_id == Some(id) {
                grade.teacher_id = None;
            }
        }
        Ok(())
    }

    // ==================== Students ====================

    async fn list_students(&self) -> RepositoryResult<Vec<Student>> {
        let store = self.store.lock();
        Ok(store
            .students
            .iter()
            .map(|(&id, s)| Student {
                id,
                last_name: s.last_name.clone(),
                first_name: s.first_name.clone(),
                middle_name: s.middle_name.clone(),
                grades_ids: store.grades_of(id),
            })
            .collect())
    }

    async fn get_student(&self, id: i32) -> RepositoryResult<Student> {
        let store = self.store.lock();
        let record = store
            .students
            .get(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("student", id))?;
        Ok(Student {
            id,
            last_name: record.last_name.clone(),
            first_name: record.first_name.clone(),
            middle_name: record.middle_name.clone(),
            grades_ids: store.grades_of(id),
        })
    }

    async fn add_student(&self, student: NewStudent) -> RepositoryResult<i32> {
        let mut store = self.store.lock();
        for &gid in &student.grades_ids {
            store.check_grade(gid)?;
        }
        store.next_student_id += 1;
        let id = store.next_student_id;
        store.students.insert(
            id,
            StudentRecord {
                last_name: student.last_name,
                first_name: student.first_name,
                middle_name: student.middle_name,
            },
        );
        for gid in student.grades_ids {
            if let Some(grade) = store.grades.get_mut(&gid) {
                grade.student_id = Some(id);
            }
        }
        Ok(id)
    }

    async fn update_student(&self, id: i32, student: NewStudent) -> RepositoryResult<()> {
        let mut store = self.store.lock();
        store.check_student(id)?;
        for &gid in &student.grades_ids {
            store.check_grade(gid)?;
        }
        let record = store
            .students
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("student", id))?;
        record.last_name = student.last_name;
        record.first_name = student.first_name;
        record.middle_name = student.middle_name;
        // Full replace: release every grade the student currently owns,
        // then claim the new set.
        for grade in store.grades.values_mut() {
            if grade.student_id == Some(id) {
                grade.student_id = None;
            }
        }
        for gid in student.grades_ids {
            if let Some(grade) = store.grades.get_mut(&gid) {
                grade.student_id = Some(id);
            }
        }
        Ok(())
    }

    async fn remove_student(&self, id: i32) -> RepositoryResult<()> {
        let mut store = self.store.lock();
        store
            .students
            .remove(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("student", id))?;
        for grade in store.grades.values_mut() {
            if grade.student_id == Some(id) {
                grade.student_id = None;
            }
        }
        Ok(())
    }

    // ==================== Grades ====================

    async fn list_grades(&self) -> RepositoryResult<Vec<Grade>> {
        let store = self.store.lock();
        Ok(store
            .grades
            .iter()
            .map(|(&id, g)| Grade {
                id,
                value: g.value,
                student_id: g.student_id,
                teacher_id: g.teacher_id,
                subject_id: g.subject_id,
            })
            .collect())
    }

    async fn get_grade(&self, id: i32) -> RepositoryResult<Grade> {
        let store = self.store.lock();
        let record = store
            .grades
            .get(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("grade", id))?;
        Ok(Grade {
            id,
            value: record.value,
            student_id: record.student_id,
            teacher_id: record.teacher_id,
            subject_id: record.subject_id,
        })
    }

    async fn add_grade(&self, grade: NewGrade) -> RepositoryResult<i32> {
        let mut store = self.store.lock();
        store.check_grade_refs(&grade)?;
        store.next_grade_id += 1;
        let id = store.next_grade_id;
        store.grades.insert(
            id,
            GradeRecord {
                value: grade.value,
                student_id: grade.student_id,
                teacher_id: grade.teacher_id,
                subject_id: grade.subject_id,
            },
        );
        Ok(id)
    }

    async fn update_grade(&self, id: i32, grade: NewGrade) -> RepositoryResult<()> {
        let mut store = self.store.lock();
        store.check_grade(id)?;
        store.check_grade_refs(&grade)?;
        let record = store
            .grades
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("grade", id))?;
        record.value = grade.value;
        record.student_id = grade.student_id;
        record.teacher_id = grade.teacher_id;
        record.subject_id = grade.subject_id;
        Ok(())
    }

    async fn remove_grade(&self, id: i32) -> RepositoryResult<()> {
        let mut store = self.store.lock();
        store
            .grades
            .remove(&id)
            .ok_or_else(|| RepositoryError::no_such_entity("grade", id))?;
        Ok(())
    }

    // ==================== Health ====================

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_assigned_monotonically_per_collection() {
        let repo = LocalRepository::new();
        let s1 = repo
            .add_subject(NewSubject {
                name: "Math".into(),
                description: String::new(),
            })
            .await
            .unwrap();
        let s2 = repo
            .add_subject(NewSubject {
                name: "Physics".into(),
                description: String::new(),
            })
            .await
            .unwrap();
        let g1 = repo
            .add_grade(NewGrade {
                value: 5,
                student_id: None,
                teacher_id: None,
                subject_id: None,
            })
            .await
            .unwrap();
        assert_eq!((s1, s2), (1, 2));
        // Grade ids are independent of subject ids.
        assert_eq!(g1, 1);
    }

    #[tokio::test]
    async fn add_grade_with_unknown_student_leaves_collection_untouched() {
        let repo = LocalRepository::new();
        let err = repo
            .add_grade(NewGrade {
                value: 4,
                student_id: Some(99),
                teacher_id: None,
                subject_id: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.list_grades().await.unwrap().is_empty());
    }
}
