//! Mock study API server for integration tests.
//!
//! # Design
//! Implements just enough of the study API wire contract to exercise the
//! client core: every route is mounted under `/api/study/`, success bodies
//! are plain JSON objects, generic errors carry `{"detail": "<string>"}`,
//! and the magic-login route returns FastAPI-style 422 validation
//! envelopes (`detail` as a list of `{loc, msg, type}` items). DTOs are
//! defined independently from the core crate; integration tests catch
//! schema drift.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub status: String,
    pub enrollment_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreAssessmentStudent {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct EnrollmentUpdate {
    pub enrollment_count: u32,
}

#[derive(Debug, Default)]
pub struct StudyData {
    pub courses: Vec<Course>,
    /// Pre-assessment submissions per course id.
    pub submissions: HashMap<String, Vec<PreAssessmentStudent>>,
}

pub type Db = Arc<RwLock<StudyData>>;

/// A database with two courses and one pre-assessment submission.
pub fn seeded_db() -> Db {
    let intro = Course {
        id: Uuid::new_v4().to_string(),
        name: "Intro to Research".to_string(),
        status: "accepted".to_string(),
        enrollment_count: 25,
    };
    let advanced = Course {
        id: Uuid::new_v4().to_string(),
        name: "Advanced Methods".to_string(),
        status: "in_review".to_string(),
        enrollment_count: 12,
    };
    let submission = PreAssessmentStudent {
        id: Uuid::new_v4().to_string(),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: "grace@example.edu".to_string(),
    };
    let mut submissions = HashMap::new();
    submissions.insert(intro.id.clone(), vec![submission]);
    Arc::new(RwLock::new(StudyData {
        courses: vec![intro, advanced],
        submissions,
    }))
}

pub fn app(db: Db) -> Router {
    Router::new()
        .route("/api/study/courses", get(list_courses))
        .route(
            "/api/study/courses/{id}/enrollment",
            patch(update_enrollment),
        )
        .route("/api/study/me", get(me))
        .route("/api/study/login/magic", post(login_magic))
        .route(
            "/api/study/preassessment/{course_id}/students",
            get(list_students),
        )
        .route(
            "/api/study/preassessment/{course_id}/students/{submission_id}",
            delete(delete_student),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db)).await
}

/// `{"detail": "<message>"}` with the given status.
fn error_response(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

/// FastAPI-style validation envelope: 422 with a `detail` item list.
fn validation_response(items: Vec<Value>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": items })),
    )
}

async fn list_courses(State(db): State<Db>) -> Json<Value> {
    let data = db.read().await;
    Json(json!({ "courses": data.courses }))
}

async fn update_enrollment(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<EnrollmentUpdate>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut data = db.write().await;
    let course = data
        .courses
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "course not found"))?;
    course.enrollment_count = input.enrollment_count;
    Ok(Json(json!({ "status": "ok" })))
}

async fn me() -> Json<Value> {
    Json(json!({
        "status": "valid",
        "error": null,
        "token": { "sub": "instructor-1", "iat": 1_700_000_000_i64, "exp": 2_000_000_000_i64 },
        "instructor": {
            "id": "instructor-1",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "academic_email": "ada@example.edu",
            "personal_email": null,
            "honorarium_status": null,
            "mailing_address": null,
            "institution": "Example University"
        },
        "feature_flags": { "flags": { "new_tables": true } }
    }))
}

/// Validates the way FastAPI would: missing fields and malformed emails
/// produce one `{loc, msg, type}` item each.
async fn login_magic(Json(input): Json<Value>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut items = Vec::new();
    match input.get("email").and_then(Value::as_str) {
        None => items.push(json!({
            "loc": ["body", "email"],
            "msg": "field required",
            "type": "missing"
        })),
        Some(email) if !email.contains('@') => items.push(json!({
            "loc": ["body", "email"],
            "msg": "value is not a valid email address",
            "type": "value_error"
        })),
        Some(_) => {}
    }
    if input.get("forward").and_then(Value::as_str).is_none() {
        items.push(json!({
            "loc": ["body", "forward"],
            "msg": "field required",
            "type": "missing"
        }));
    }
    if !items.is_empty() {
        return Err(validation_response(items));
    }
    Ok(Json(json!({ "status": "ok" })))
}

async fn list_students(
    State(db): State<Db>,
    Path(course_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let data = db.read().await;
    if !data.courses.iter().any(|c| c.id == course_id) {
        return Err(error_response(StatusCode::NOT_FOUND, "course not found"));
    }
    let students = data.submissions.get(&course_id).cloned().unwrap_or_default();
    Ok(Json(json!({
        "pre_assessment_submissions": students,
        "post_assessment_submissions": []
    })))
}

async fn delete_student(
    State(db): State<Db>,
    Path((course_id, submission_id)): Path<(String, String)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut data = db.write().await;
    let students = data
        .submissions
        .get_mut(&course_id)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "course not found"))?;
    let before = students.len();
    students.retain(|s| s.id != submission_id);
    if students.len() == before {
        return Err(error_response(StatusCode::NOT_FOUND, "submission not found"));
    }
    Ok(Json(json!({ "status": "ok" })))
}
