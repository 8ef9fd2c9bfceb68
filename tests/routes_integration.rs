//! End-to-end tests for the REST API, driven through the router with an
//! in-memory repository behind it.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use school_diary::db::RepositoryFactory;
use school_diary::http::{create_router, AppState};

fn app() -> Router {
    create_router(AppState::new(RepositoryFactory::create_local()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, uri: &str, body: Value) {
    let (status, _) = send(app, "POST", uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn health_endpoint_reports_connected_store() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn subject_crud_through_the_api() {
    let app = app();

    create(
        &app,
        "/subjects",
        json!({"name": "Math", "description": "Numbers"}),
    )
    .await;

    let (status, listed) = send(&app, "GET", "/subjects", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["name"], "Math");
    let id = listed[0]["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/subjects/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, json!({"name": "Math", "description": "Numbers"}));

    // Total replace: the omitted description is written as empty.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/subjects/{}", id),
        Some(json!({"name": "Algebra"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, updated) = send(&app, "GET", &format!("/subjects/{}", id), None).await;
    assert_eq!(updated, json!({"name": "Algebra", "description": ""}));

    let (status, _) = send(&app, "DELETE", &format!("/subjects/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/subjects/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn grade_creation_links_all_three_references() {
    let app = app();
    create(&app, "/subjects", json!({"name": "Math", "description": ""})).await;
    create(
        &app,
        "/teachers",
        json!({
            "lastName": "Petrova", "firstName": "Maria", "middleName": "V",
            "phone": "555-0101", "subjectsIds": [1]
        }),
    )
    .await;
    create(
        &app,
        "/students",
        json!({"lastName": "Sidorov", "firstName": "Ivan", "middleName": "P"}),
    )
    .await;

    create(
        &app,
        "/grades",
        json!({"value": 5, "studentId": 1, "teacherId": 1, "subjectId": 1}),
    )
    .await;

    let (_, grades) = send(&app, "GET", "/grades", None).await;
    assert_eq!(grades.as_array().unwrap().len(), 1);
    let grade_id = grades[0]["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/grades/{}", grade_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        fetched,
        json!({"value": 5, "studentId": 1, "teacherId": 1, "subjectId": 1})
    );
}

#[tokio::test]
async fn grade_with_unknown_student_is_rejected_before_any_write() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/grades",
        Some(json!({"value": 5, "studentId": 42})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, grades) = send(&app, "GET", "/grades", None).await;
    assert!(grades.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn student_reads_back_grades_in_supplied_order() {
    let app = app();
    for value in [3, 4, 5] {
        create(&app, "/grades", json!({"value": value})).await;
    }

    create(
        &app,
        "/students",
        json!({
            "lastName": "Sidorov", "firstName": "Ivan", "middleName": "P",
            "gradesIds": [1, 2, 3]
        }),
    )
    .await;

    let (status, fetched) = send(&app, "GET", "/students/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["gradesIds"], json!([1, 2, 3]));
}

#[tokio::test]
async fn deleting_a_student_clears_the_grade_reference() {
    let app = app();
    create(&app, "/grades", json!({"value": 5})).await;
    create(
        &app,
        "/students",
        json!({
            "lastName": "Sidorov", "firstName": "Ivan", "middleName": "P",
            "gradesIds": [1]
        }),
    )
    .await;

    let (status, _) = send(&app, "DELETE", "/students/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, orphan) = send(&app, "GET", "/grades/1", None).await;
    assert_eq!(orphan["studentId"], Value::Null);
    assert_eq!(orphan["value"], 5);
}

#[tokio::test]
async fn deleting_a_subject_detaches_it_from_teachers() {
    let app = app();
    create(&app, "/subjects", json!({"name": "Math", "description": ""})).await;
    create(&app, "/subjects", json!({"name": "Physics", "description": ""})).await;
    create(
        &app,
        "/teachers",
        json!({
            "lastName": "Petrova", "firstName": "Maria", "middleName": "V",
            "phone": "555-0101", "subjectsIds": [1, 2]
        }),
    )
    .await;

    let (status, _) = send(&app, "DELETE", "/subjects/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, teacher) = send(&app, "GET", "/teachers/1", None).await;
    assert_eq!(teacher["subjectsIds"], json!([2]));
}

#[tokio::test]
async fn missing_ids_yield_not_found_on_every_verb() {
    let app = app();

    for uri in ["/subjects/7", "/teachers/7", "/students/7", "/grades/7"] {
        let (status, _) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {}", uri);
        let (status, _) = send(&app, "DELETE", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {}", uri);
    }

    let (status, _) = send(
        &app,
        "PUT",
        "/grades/7",
        Some(json!({"value": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn teacher_update_with_bad_subject_reference_is_rejected() {
    let app = app();
    create(
        &app,
        "/teachers",
        json!({
            "lastName": "Petrova", "firstName": "Maria", "middleName": "V",
            "phone": "555-0101"
        }),
    )
    .await;

    let (status, _) = send(
        &app,
        "PUT",
        "/teachers/1",
        Some(json!({
            "lastName": "Petrova", "firstName": "Maria", "middleName": "V",
            "phone": "555-0101", "subjectsIds": [9]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The teacher itself is unchanged.
    let (_, fetched) = send(&app, "GET", "/teachers/1", None).await;
    assert_eq!(fetched["subjectsIds"], json!([]));
}

#[tokio::test]
async fn update_replaces_the_owned_grade_set() {
    let app = app();
    create(&app, "/grades", json!({"value": 3})).await;
    create(&app, "/grades", json!({"value": 4})).await;
    create(
        &app,
        "/students",
        json!({
            "lastName": "Sidorov", "firstName": "Ivan", "middleName": "P",
            "gradesIds": [1, 2]
        }),
    )
    .await;

    let (status, _) = send(
        &app,
        "PUT",
        "/students/1",
        Some(json!({
            "lastName": "Sidorov", "firstName": "Ivan", "middleName": "P",
            "gradesIds": [2]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = send(&app, "GET", "/students/1", None).await;
    assert_eq!(fetched["gradesIds"], json!([2]));
    let (_, released) = send(&app, "GET", "/grades/1", None).await;
    assert_eq!(released["studentId"], Value::Null);
}
