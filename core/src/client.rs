//! Endpoint operations for the study API.
//!
//! # Design
//! One function per API operation, each a thin declaration of method, path
//! and payload over the dispatcher. All of them return the raw [`Envelope`]
//! so call sites choose between [`expand`](crate::envelope::expand) and
//! [`explode`](crate::envelope::explode) handling.

use serde::Serialize;

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::Fetch;
use crate::request::{delete, get, patch, post};
use crate::types::{LoginAsRequest, MagicLoginRequest};

/// No query or body data.
const NONE: Option<&()> = None;

/// Get the current user's courses.
pub async fn get_my_courses(fetch: &dyn Fetch) -> Result<Envelope, ApiError> {
    get(fetch, "courses", NONE).await
}

#[derive(Serialize)]
struct EnrollmentUpdate {
    enrollment_count: u32,
}

/// Set the enrollment count for a course.
pub async fn update_course_enrollment(
    fetch: &dyn Fetch,
    course_id: &str,
    enrollment_count: u32,
) -> Result<Envelope, ApiError> {
    patch(
        fetch,
        &format!("courses/{course_id}/enrollment"),
        Some(&EnrollmentUpdate { enrollment_count }),
    )
    .await
}

/// Get the current session.
pub async fn me(fetch: &dyn Fetch) -> Result<Envelope, ApiError> {
    get(fetch, "me", NONE).await
}

/// Perform a login by sending a magic link.
pub async fn login_with_magic_link(
    fetch: &dyn Fetch,
    email: &str,
    forward: &str,
) -> Result<Envelope, ApiError> {
    post(
        fetch,
        "login/magic",
        Some(&MagicLoginRequest {
            email: email.to_string(),
            forward: forward.to_string(),
        }),
    )
    .await
}

/// Request a login-as magic link for admins.
pub async fn login_as_with_magic_link(
    fetch: &dyn Fetch,
    instructor_email: &str,
    admin_email: &str,
    forward: &str,
) -> Result<Envelope, ApiError> {
    post(
        fetch,
        "admin/login-as",
        Some(&LoginAsRequest {
            instructor_email: instructor_email.to_string(),
            admin_email: admin_email.to_string(),
            forward: forward.to_string(),
        }),
    )
    .await
}

#[derive(Serialize)]
struct NoticeSeen<'a> {
    key: &'a str,
}

/// Mark a notice as seen for this instructor.
pub async fn mark_notice_seen(fetch: &dyn Fetch, key: &str) -> Result<Envelope, ApiError> {
    post(fetch, "me/notices/seen", Some(&NoticeSeen { key })).await
}

/// Get pre- and post-assessment submissions for a course.
pub async fn get_pre_assessment_students(
    fetch: &dyn Fetch,
    course_id: &str,
) -> Result<Envelope, ApiError> {
    get(fetch, &format!("preassessment/{course_id}/students"), NONE).await
}

/// Remove one pre-assessment submission.
pub async fn delete_pre_assessment_student(
    fetch: &dyn Fetch,
    course_id: &str,
    submission_id: &str,
) -> Result<Envelope, ApiError> {
    delete(
        fetch,
        &format!("preassessment/{course_id}/students/{submission_id}"),
        NONE,
    )
    .await
}
