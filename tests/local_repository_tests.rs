//! CRUD and referential-policy tests for the in-memory repository.

use school_diary::db::models::{NewGrade, NewStudent, NewSubject, NewTeacher};
use school_diary::db::repositories::LocalRepository;
use school_diary::db::SchoolRepository;

fn subject(name: &str) -> NewSubject {
    NewSubject {
        name: name.to_string(),
        description: format!("{} course", name),
    }
}

fn teacher(last_name: &str, subjects_ids: Vec<i32>) -> NewTeacher {
    NewTeacher {
        last_name: last_name.to_string(),
        first_name: "Maria".to_string(),
        middle_name: "V".to_string(),
        phone: "555-0101".to_string(),
        subjects_ids,
    }
}

fn student(last_name: &str, grades_ids: Vec<i32>) -> NewStudent {
    NewStudent {
        last_name: last_name.to_string(),
        first_name: "Ivan".to_string(),
        middle_name: "P".to_string(),
        grades_ids,
    }
}

fn grade(value: i32) -> NewGrade {
    NewGrade {
        value,
        student_id: None,
        teacher_id: None,
        subject_id: None,
    }
}

#[tokio::test]
async fn created_grade_reads_back_with_matching_references() {
    let repo = LocalRepository::new();
    let subject_id = repo.add_subject(subject("Math")).await.unwrap();
    let teacher_id = repo.add_teacher(teacher("Petrova", vec![])).await.unwrap();
    let student_id = repo.add_student(student("Sidorov", vec![])).await.unwrap();

    let grade_id = repo
        .add_grade(NewGrade {
            value: 5,
            student_id: Some(student_id),
            teacher_id: Some(teacher_id),
            subject_id: Some(subject_id),
        })
        .await
        .unwrap();

    let fetched = repo.get_grade(grade_id).await.unwrap();
    assert_eq!(fetched.value, 5);
    assert_eq!(fetched.student_id, Some(student_id));
    assert_eq!(fetched.teacher_id, Some(teacher_id));
    assert_eq!(fetched.subject_id, Some(subject_id));
}

#[tokio::test]
async fn list_returns_exactly_one_entry_per_row() {
    let repo = LocalRepository::new();
    for name in ["Math", "Physics", "History"] {
        repo.add_subject(subject(name)).await.unwrap();
    }

    let listed = repo.list_subjects().await.unwrap();
    assert_eq!(listed.len(), 3);
    let mut ids: Vec<i32> = listed.iter().map(|s| s.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn operations_on_missing_ids_fail_without_side_effects() {
    let repo = LocalRepository::new();
    repo.add_subject(subject("Math")).await.unwrap();

    assert!(repo.get_subject(99).await.unwrap_err().is_not_found());
    assert!(repo
        .update_subject(99, subject("Physics"))
        .await
        .unwrap_err()
        .is_not_found());
    assert!(repo.remove_subject(99).await.unwrap_err().is_not_found());

    assert_eq!(repo.list_subjects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_is_a_total_replace() {
    let repo = LocalRepository::new();
    let id = repo.add_subject(subject("Math")).await.unwrap();

    repo.update_subject(
        id,
        NewSubject {
            name: "Algebra".to_string(),
            description: String::new(),
        },
    )
    .await
    .unwrap();

    let fetched = repo.get_subject(id).await.unwrap();
    assert_eq!(fetched.name, "Algebra");
    assert_eq!(fetched.description, "");
}

#[tokio::test]
async fn delete_removes_exactly_one_row() {
    let repo = LocalRepository::new();
    let first = repo.add_grade(grade(3)).await.unwrap();
    let second = repo.add_grade(grade(4)).await.unwrap();

    repo.remove_grade(first).await.unwrap();

    let remaining = repo.list_grades().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second);
    assert!(repo.get_grade(first).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn student_owns_listed_grades_in_id_order() {
    let repo = LocalRepository::new();
    let g1 = repo.add_grade(grade(3)).await.unwrap();
    let g2 = repo.add_grade(grade(4)).await.unwrap();
    let g3 = repo.add_grade(grade(5)).await.unwrap();

    let id = repo
        .add_student(student("Sidorov", vec![g1, g2, g3]))
        .await
        .unwrap();

    let fetched = repo.get_student(id).await.unwrap();
    assert_eq!(fetched.grades_ids, vec![g1, g2, g3]);
}

#[tokio::test]
async fn update_student_releases_grades_dropped_from_the_list() {
    let repo = LocalRepository::new();
    let g1 = repo.add_grade(grade(3)).await.unwrap();
    let g2 = repo.add_grade(grade(4)).await.unwrap();
    let id = repo
        .add_student(student("Sidorov", vec![g1, g2]))
        .await
        .unwrap();

    repo.update_student(id, student("Sidorov", vec![g2]))
        .await
        .unwrap();

    assert_eq!(repo.get_student(id).await.unwrap().grades_ids, vec![g2]);
    assert_eq!(repo.get_grade(g1).await.unwrap().student_id, None);
    assert_eq!(repo.get_grade(g2).await.unwrap().student_id, Some(id));
}

#[tokio::test]
async fn deleting_a_student_clears_grade_references() {
    let repo = LocalRepository::new();
    let g = repo.add_grade(grade(5)).await.unwrap();
    let id = repo.add_student(student("Sidorov", vec![g])).await.unwrap();

    repo.remove_student(id).await.unwrap();

    let orphan = repo.get_grade(g).await.unwrap();
    assert_eq!(orphan.student_id, None);
}

#[tokio::test]
async fn deleting_a_subject_clears_grades_and_teacher_associations() {
    let repo = LocalRepository::new();
    let math = repo.add_subject(subject("Math")).await.unwrap();
    let physics = repo.add_subject(subject("Physics")).await.unwrap();
    let t = repo
        .add_teacher(teacher("Petrova", vec![math, physics]))
        .await
        .unwrap();
    let g = repo
        .add_grade(NewGrade {
            value: 4,
            student_id: None,
            teacher_id: None,
            subject_id: Some(math),
        })
        .await
        .unwrap();

    repo.remove_subject(math).await.unwrap();

    assert_eq!(repo.get_teacher(t).await.unwrap().subjects_ids, vec![physics]);
    assert_eq!(repo.get_grade(g).await.unwrap().subject_id, None);
}

#[tokio::test]
async fn deleting_a_teacher_clears_grade_references() {
    let repo = LocalRepository::new();
    let t = repo.add_teacher(teacher("Petrova", vec![])).await.unwrap();
    let g = repo
        .add_grade(NewGrade {
            value: 4,
            student_id: None,
            teacher_id: Some(t),
            subject_id: None,
        })
        .await
        .unwrap();

    repo.remove_teacher(t).await.unwrap();

    assert_eq!(repo.get_grade(g).await.unwrap().teacher_id, None);
}

#[tokio::test]
async fn bad_references_fail_the_whole_operation() {
    let repo = LocalRepository::new();

    let err = repo
        .add_teacher(teacher("Petrova", vec![123]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(repo.list_teachers().await.unwrap().is_empty());

    let err = repo
        .add_student(student("Sidorov", vec![77]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(repo.list_students().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_subject_ids_collapse_to_one_association() {
    let repo = LocalRepository::new();
    let math = repo.add_subject(subject("Math")).await.unwrap();
    let physics = repo.add_subject(subject("Physics")).await.unwrap();

    let t = repo
        .add_teacher(teacher("Petrova", vec![math, math, physics]))
        .await
        .unwrap();
    assert_eq!(
        repo.get_teacher(t).await.unwrap().subjects_ids,
        vec![math, physics]
    );

    repo.update_teacher(t, teacher("Petrova", vec![physics, physics]))
        .await
        .unwrap();
    assert_eq!(repo.get_teacher(t).await.unwrap().subjects_ids, vec![physics]);
}

#[tokio::test]
async fn grades_read_back_in_ascending_id_order_regardless_of_supplied_order() {
    let repo = LocalRepository::new();
    let g1 = repo.add_grade(grade(3)).await.unwrap();
    let g2 = repo.add_grade(grade(4)).await.unwrap();
    let g3 = repo.add_grade(grade(5)).await.unwrap();

    let id = repo
        .add_student(student("Sidorov", vec![g3, g1, g2]))
        .await
        .unwrap();

    // The foreign key carries no position, so ownership reads back in
    // ascending grade-id order whatever order the ids were supplied in.
    assert_eq!(repo.get_student(id).await.unwrap().grades_ids, vec![g1, g2, g3]);
}

#[tokio::test]
async fn teacher_subject_order_follows_the_supplied_list() {
    let repo = LocalRepository::new();
    let math = repo.add_subject(subject("Math")).await.unwrap();
    let physics = repo.add_subject(subject("Physics")).await.unwrap();

    let t = repo
        .add_teacher(teacher("Petrova", vec![physics, math]))
        .await
        .unwrap();

    assert_eq!(
        repo.get_teacher(t).await.unwrap().subjects_ids,
        vec![physics, math]
    );
}
