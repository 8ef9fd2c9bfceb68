//! Diesel table definitions for the embedded SQLite schema.
//!
//! Foreign keys carry no ON DELETE behavior on purpose: the set-null
//! policy is applied explicitly by the delete operations in `mod.rs`.

diesel::table! {
    subjects (id) {
        id -> Integer,
        name -> Text,
        description -> Text,
    }
}

diesel::table! {
    teachers (id) {
        id -> Integer,
        last_name -> Text,
        first_name -> Text,
        middle_name -> Text,
        phone -> Text,
    }
}

diesel::table! {
    students (id) {
        id -> Integer,
        last_name -> Text,
        first_name -> Text,
        middle_name -> Text,
    }
}

diesel::table! {
    grades (id) {
        id -> Integer,
        value -> Integer,
        student_id -> Nullable<Integer>,
        teacher_id -> Nullable<Integer>,
        subject_id -> Nullable<Integer>,
    }
}

diesel::table! {
    teacher_subjects (teacher_id, subject_id) {
        teacher_id -> Integer,
        subject_id -> Integer,
        position -> Integer,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    subjects,
    teachers,
    students,
    grades,
    teacher_subjects,
);
