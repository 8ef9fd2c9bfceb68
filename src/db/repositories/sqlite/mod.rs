//! SQLite repository implementation using Diesel.
//!
//! The embedded database is the production backend. Connections come from
//! an r2d2 pool; every repository call runs on `spawn_blocking` and every
//! mutating call executes inside a single Diesel transaction, so reference
//! checks and writes either fully apply or roll back together.
//!
//! The schema is created at startup if absent (no migration mechanism).
//! Set-null on delete is implemented explicitly in the delete operations
//! rather than through ON DELETE clauses.

use std::time::Duration;

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::Integer;
use diesel::sqlite::SqliteConnection;
use tokio::task;
use tracing::info;

use crate::db::config::SqliteConfig;
use crate::db::models::{
    Grade, NewGrade, NewStudent, NewSubject, NewTeacher, Student, Subject, Teacher,
};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, SchoolRepository};

mod models;
mod schema;

use models::{
    GradeRow, NewGradeRow, NewStudentRow, NewSubjectRow, NewTeacherRow, StudentRow, SubjectRow,
    TeacherRow, TeacherSubjectRow,
};
use schema::{grades, students, subjects, teacher_subjects, teachers};

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

const SCHEMA_DDL: &str = "
CREATE TABLE IF NOT EXISTS subjects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS teachers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    last_name TEXT NOT NULL,
    first_name TEXT NOT NULL,
    middle_name TEXT NOT NULL,
    phone TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    last_name TEXT NOT NULL,
    first_name TEXT NOT NULL,
    middle_name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS grades (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value INTEGER NOT NULL,
    student_id INTEGER REFERENCES students(id),
    teacher_id INTEGER REFERENCES teachers(id),
    subject_id INTEGER REFERENCES subjects(id)
);
CREATE TABLE IF NOT EXISTS teacher_subjects (
    teacher_id INTEGER NOT NULL REFERENCES teachers(id),
    subject_id INTEGER NOT NULL REFERENCES subjects(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (teacher_id, subject_id)
);
";

/// Enables foreign key enforcement on every pooled connection and keeps
/// writers from failing immediately when the database file is locked.
#[derive(Debug, Clone, Copy)]
struct ConnectionSetup;

impl diesel::r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionSetup {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// SQLite implementation of [`SchoolRepository`].
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (or create) the database and ensure the schema exists.
    pub fn new(config: &SqliteConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .connection_customizer(Box::new(ConnectionSetup))
            .build(manager)?;

        let mut conn = pool.get()?;
        conn.batch_execute(SCHEMA_DDL).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Schema creation failed: {}", e),
                ErrorContext::new("ensure_schema"),
            )
        })?;
        info!(database_url = %config.database_url, "SQLite schema ensured");

        Ok(Self { pool })
    }

    /// Run a blocking Diesel operation on the runtime's blocking pool.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(RepositoryError::from)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
        .map_err(|e| e.with_operation(operation))
    }
}

fn last_insert_rowid(conn: &mut SqliteConnection) -> RepositoryResult<i32> {
    diesel::select(sql::<Integer>("last_insert_rowid()"))
        .get_result::<i32>(conn)
        .map_err(Into::into)
}

fn subject_exists(conn: &mut SqliteConnection, id: i32) -> RepositoryResult<()> {
    subjects::table
        .find(id)
        .select(subjects::id)
        .first::<i32>(conn)
        .optional()?
        .map(|_| ())
        .ok_or_else(|| RepositoryError::no_such_entity("subject", id))
}

fn teacher_exists(conn: &mut SqliteConnection, id: i32) -> RepositoryResult<()> {
    teachers::table
        .find(id)
        .select(teachers::id)
        .first::<i32>(conn)
        .optional()?
        .map(|_| ())
        .ok_or_else(|| RepositoryError::no_such_entity("teacher", id))
}

fn student_exists(conn: &mut SqliteConnection, id: i32) -> RepositoryResult<()> {
    students::table
        .find(id)
        .select(students::id)
        .first::<i32>(conn)
        .optional()?
        .map(|_| ())
        .ok_or_else(|| RepositoryError::no_such_entity("student", id))
}

fn grade_exists(conn: &mut SqliteConnection, id: i32) -> RepositoryResult<()> {
    grades::table
        .find(id)
        .select(grades::id)
        .first::<i32>(conn)
        .optional()?
        .map(|_| ())
        .ok_or_else(|| RepositoryError::no_such_entity("grade", id))
}

/// Reference checks for a grade write, before any row is touched.
fn check_grade_refs(conn: &mut SqliteConnection, row: &NewGradeRow) -> RepositoryResult<()> {
    if let Some(id) = row.student_id {
        student_exists(conn, id)?;
    }
    if let Some(id) = row.teacher_id {
        teacher_exists(conn, id)?;
    }
    if let Some(id) = row.subject_id {
        subject_exists(conn, id)?;
    }
    Ok(())
}

/// Ordered subject ids associated with a teacher.
fn subjects_of(conn: &mut SqliteConnection, teacher_id: i32) -> RepositoryResult<Vec<i32>> {
    teacher_subjects::table
        .filter(teacher_subjects::teacher_id.eq(teacher_id))
        .order(teacher_subjects::position.asc())
        .select(teacher_subjects::subject_id)
        .load::<i32>(conn)
        .map_err(Into::into)
}

/// Grade ids owned by a student, in ascending grade-id order.
fn grades_of(conn: &mut SqliteConnection, student_id: i32) -> RepositoryResult<Vec<i32>> {
    grades::table
        .filter(grades::student_id.eq(student_id))
        .order(grades::id.asc())
        .select(grades::id)
        .load::<i32>(conn)
        .map_err(Into::into)
}

/// Replace a teacher's join-table rows with the supplied ordered set.
/// Duplicate subject ids collapse to one association, first occurrence
/// wins, so the composite primary key is never violated.
fn replace_teacher_subjects(
    conn: &mut SqliteConnection,
    teacher_id: i32,
    subjects_ids: &[i32],
) -> RepositoryResult<()> {
    diesel::delete(teacher_subjects::table.filter(teacher_subjects::teacher_id.eq(teacher_id)))
        .execute(conn)?;
    let mut seen = std::collections::BTreeSet::new();
    let rows: Vec<TeacherSubjectRow> = subjects_ids
        .iter()
        .filter(|&&subject_id| seen.insert(subject_id))
        .enumerate()
        .map(|(position, &subject_id)| TeacherSubjectRow {
            teacher_id,
            subject_id,
            position: position as i32,
        })
        .collect();
    diesel::insert_into(teacher_subjects::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

#[async_trait]
impl SchoolRepository for SqliteRepository {
    // ==================== Subjects ====================

    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>> {
        self.with_conn("list_subjects", |conn| {
            let rows = subjects::table
                .order(subjects::id.asc())
                .load::<SubjectRow>(conn)?;
            Ok(rows.into_iter().map(Subject::from).collect())
        })
        .await
    }

    async fn get_subject(&self, id: i32) -> RepositoryResult<Subject> {
        self.with_conn("get_subject", move |conn| {
            subjects::table
                .find(id)
                .first::<SubjectRow>(conn)
                .optional()?
                .map(Subject::from)
                .ok_or_else(|| RepositoryError::no_such_entity("subject", id))
        })
        .await
    }

    async fn add_subject(&self, subject: NewSubject) -> RepositoryResult<i32> {
        self.with_conn("add_subject", move |conn| {
            conn.transaction(|conn| {
                diesel::insert_into(subjects::table)
                    .values(NewSubjectRow {
                        name: subject.name,
                        description: subject.description,
                    })
                    .execute(conn)?;
                last_insert_rowid(conn)
            })
        })
        .await
    }

    async fn update_subject(&self, id: i32, subject: NewSubject) -> RepositoryResult<()> {
        self.with_conn("update_subject", move |conn| {
            let updated = diesel::update(subjects::table.find(id))
                .set(NewSubjectRow {
                    name: subject.name,
                    description: subject.description,
                })
                .execute(conn)?;
            if updated == 0 {
                return Err(RepositoryError::no_such_entity("subject", id));
            }
            Ok(())
        })
        .await
    }

    async fn remove_subject(&self, id: i32) -> RepositoryResult<()> {
        self.with_conn("remove_subject", move |conn| {
            conn.transaction(|conn| {
                // Set-null on delete, applied before the row goes away.
                diesel::update(grades::table.filter(grades::subject_id.eq(id)))
                    .set(grades::subject_id.eq(None::<i32>))
                    .execute(conn)?;
                diesel::delete(
                    teacher_subjects::table.filter(teacher_subjects::subject_id.eq(id)),
                )
                .execute(conn)?;
                let deleted = diesel::delete(subjects::table.find(id)).execute(conn)?;
                if deleted == 0 {
                    return Err(RepositoryError::no_such_entity("subject", id));
                }
                Ok(())
            })
        })
        .await
    }

    // ==================== Teachers ====================

    async fn list_teachers(&self) -> RepositoryResult<Vec<Teacher>> {
        self.with_conn("list_teachers", |conn| {
            let rows = teachers::table
                .order(teachers::id.asc())
                .load::<TeacherRow>(conn)?;
            let associations = teacher_subjects::table
                .order((
                    teacher_subjects::teacher_id.asc(),
                    teacher_subjects::position.asc(),
                ))
                .select((teacher_subjects::teacher_id, teacher_subjects::subject_id))
                .load::<(i32, i32)>(conn)?;
            let mut by_teacher: std::collections::BTreeMap<i32, Vec<i32>> = Default::default();
            for (teacher_id, subject_id) in associations {
                by_teacher.entry(teacher_id).or_default().push(subject_id);
            }
            Ok(rows
                .into_iter()
                .map(|row| {
                    let subjects_ids = by_teacher.remove(&row.id).unwrap_or_default();
                    row.into_teacher(subjects_ids)
                })
                .collect())
        })
        .await
    }

    async fn get_teacher(&self, id: i32) -> RepositoryResult<Teacher> {
        self.with_conn("get_teacher", move |conn| {
            let row = teachers::table
                .find(id)
                .first::<TeacherRow>(conn)
                .optional()?
                .ok_or_else(|| RepositoryError::no_such_entity("teacher", id))?;
            let subjects_ids = subjects_of(conn, id)?;
            Ok(row.into_teacher(subjects_ids))
        })
        .await
    }

    async fn add_teacher(&self, teacher: NewTeacher) -> RepositoryResult<i32> {
        self.with_conn("add_teacher", move |conn| {
            conn.transaction(|conn| {
                for &sid in &teacher.subjects_ids {
                    subject_exists(conn, sid)?;
                }
                diesel::insert_into(teachers::table)
                    .values(NewTeacherRow {
                        last_name: teacher.last_name,
                        first_name: teacher.first_name,
                        middle_name: teacher.middle_name,
                        phone: teacher.phone,
                    })
                    .execute(conn)?;
                let id = last_insert_rowid(conn)?;
                replace_teacher_subjects(conn, id, &teacher.subjects_ids)?;
                Ok(id)
            })
        })
        .await
    }

    async fn update_teacher(&self, id: i32, teacher: NewTeacher) -> RepositoryResult<()> {
        self.with_conn("update_teacher", move |conn| {
            conn.transaction(|conn| {
                for &sid in &teacher.subjects_ids {
                    subject_exists(conn, sid)?;
                }
                let updated = diesel::update(teachers::table.find(id))
                    .set(NewTeacherRow {
                        last_name: teacher.last_name,
                        first_name: teacher.first_name,
                        middle_name: teacher.middle_name,
                        phone: teacher.phone,
                    })
                    .execute(conn)?;
                if updated == 0 {
                    return Err(RepositoryError::no_such_entity("teacher", id));
                }
                replace_teacher_subjects(conn, id, &teacher.subjects_ids)
            })
        })
        .await
    }

    async fn remove_teacher(&self, id: i32) -> RepositoryResult<()> {
        self.with_conn("remove_teacher", move |conn| {
            conn.transaction(|conn| {
                diesel::update(grades::table.filter(grades::teacher_id.eq(id)))
                    .set(grades::teacher_id.eq(None::<i32>))
                    .execute(conn)?;
                diesel::delete(
                    teacher_subjects::table.filter(teacher_subjects::teacher_id.eq(id)),
                )
                .execute(conn)?;
                let deleted = diesel::delete(teachers::table.find(id)).execute(conn)?;
                if deleted == 0 {
                    return Err(RepositoryError::no_such_entity("teacher", id));
                }
                Ok(())
            })
        })
        .await
    }

    // ==================== Students ====================

    async fn list_students(&self) -> RepositoryResult<Vec<Student>> {
        self.with_conn("list_students", |conn| {
            let rows = students::table
                .order(students::id.asc())
                .load::<StudentRow>(conn)?;
            let owned = grades::table
                .filter(grades::student_id.is_not_null())
                .order(grades::id.asc())
                .select((grades::id, grades::student_id))
                .load::<(i32, Option<i32>)>(conn)?;
            let mut by_student: std::collections::BTreeMap<i32, Vec<i32>> = Default::default();
            for (grade_id, student_id) in owned {
                if let Some(student_id) = student_id {
                    by_student.entry(student_id).or_default().push(grade_id);
                }
            }
            Ok(rows
                .into_iter()
                .map(|row| {
                    let grades_ids = by_student.remove(&row.id).unwrap_or_default();
                    row.into_student(grades_ids)
                })
                .collect())
        })
        .await
    }

    async fn get_student(&self, id: i32) -> RepositoryResult<Student> {
        self.with_conn("get_student", move |conn| {
            let row = students::table
                .find(id)
                .first::<StudentRow>(conn)
                .optional()?
                .ok_or_else(|| RepositoryError::no_such_entity("student", id))?;
            let grades_ids = grades_of(conn, id)?;
            Ok(row.into_student(grades_ids))
        })
        .await
    }

    async fn add_student(&self, student: NewStudent) -> RepositoryResult<i32> {
        self.with_conn("add_student", move |conn| {
            conn.transaction(|conn| {
                for &gid in &student.grades_ids {
                    grade_exists(conn, gid)?;
                }
                diesel::insert_into(students::table)
                    .values(NewStudentRow {
                        last_name: student.last_name,
                        first_name: student.first_name,
                        middle_name: student.middle_name,
                    })
                    .execute(conn)?;
                let id = last_insert_rowid(conn)?;
                diesel::update(grades::table.filter(grades::id.eq_any(&student.grades_ids)))
                    .set(grades::student_id.eq(id))
                    .execute(conn)?;
                Ok(id)
            })
        })
        .await
    }

    async fn update_student(&self, id: i32, student: NewStudent) -> RepositoryResult<()> {
        self.with_conn("update_student", move |conn| {
            conn.transaction(|conn| {
                for &gid in &student.grades_ids {
                    grade_exists(conn, gid)?;
                }
                let updated = diesel::update(students::table.find(id))
                    .set(NewStudentRow {
                        last_name: student.last_name,
                        first_name: student.first_name,
                        middle_name: student.middle_name,
                    })
                    .execute(conn)?;
                if updated == 0 {
                    return Err(RepositoryError::no_such_entity("student", id));
                }
                // Full replace of the owned grade set.
                diesel::update(grades::table.filter(grades::student_id.eq(id)))
                    .set(grades::student_id.eq(None::<i32>))
                    .execute(conn)?;
                diesel::update(grades::table.filter(grades::id.eq_any(&student.grades_ids)))
                    .set(grades::student_id.eq(id))
                    .execute(conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn remove_student(&self, id: i32) -> RepositoryResult<()> {
        self.with_conn("remove_student", move |conn| {
            conn.transaction(|conn| {
                diesel::update(grades::table.filter(grades::student_id.eq(id)))
                    .set(grades::student_id.eq(None::<i32>))
                    .execute(conn)?;
                let deleted = diesel::delete(students::table.find(id)).execute(conn)?;
                if deleted == 0 {
                    return Err(RepositoryError::no_such_entity("student", id));
                }
                Ok(())
            })
        })
        .await
    }

    // ==================== Grades ====================

    async fn list_grades(&self) -> RepositoryResult<Vec<Grade>> {
        self.with_conn("list_grades", |conn| {
            let rows = grades::table.order(grades::id.asc()).load::<GradeRow>(conn)?;
            Ok(rows.into_iter().map(Grade::from).collect())
        })
        .await
    }

    async fn get_grade(&self, id: i32) -> RepositoryResult<Grade> {
        self.with_conn("get_grade", move |conn| {
            grades::table
                .find(id)
                .first::<GradeRow>(conn)
                .optional()?
                .map(Grade::from)
                .ok_or_else(|| RepositoryError::no_such_entity("grade", id))
        })
        .await
    }

    async fn add_grade(&self, grade: NewGrade) -> RepositoryResult<i32> {
        self.with_conn("add_grade", move |conn| {
            conn.transaction(|conn| {
                let row = NewGradeRow {
                    value: grade.value,
                    student_id: grade.student_id,
                    teacher_id: grade.teacher_id,
                    subject_id: grade.subject_id,
                };
                check_grade_refs(conn, &row)?;
                diesel::insert_into(grades::table).values(row).execute(conn)?;
                last_insert_rowid(conn)
            })
        })
        .await
    }

    async fn update_grade(&self, id: i32, grade: NewGrade) -> RepositoryResult<()> {
        self.with_conn("update_grade", move |conn| {
            conn.transaction(|conn| {
                let row = NewGradeRow {
                    value: grade.value,
                    student_id: grade.student_id,
                    teacher_id: grade.teacher_id,
                    subject_id: grade.subject_id,
                };
                check_grade_refs(conn, &row)?;
                let updated = diesel::update(grades::table.find(id)).set(row).execute(conn)?;
                if updated == 0 {
                    return Err(RepositoryError::no_such_entity("grade", id));
                }
                Ok(())
            })
        })
        .await
    }

    async fn remove_grade(&self, id: i32) -> RepositoryResult<()> {
        self.with_conn("remove_grade", move |conn| {
            let deleted = diesel::delete(grades::table.find(id)).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::no_such_entity("grade", id));
            }
            Ok(())
        })
        .await
    }

    // ==================== Health ====================

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            diesel::sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }
}
