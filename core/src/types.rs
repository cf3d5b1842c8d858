//! Domain DTOs for the study API.
//!
//! # Design
//! These types mirror the server's schema but are defined independently of
//! the mock-server crate; integration tests catch schema drift. Ids are
//! server-assigned opaque strings. Optional request fields use
//! `skip_serializing_if` so omitted values never reach the wire (the
//! query-string encoder additionally drops explicit nulls).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cache::Keyed;

/// Review status of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    InReview,
    Accepted,
    Rejected,
    Withdrawn,
}

/// Which study arm a course was randomized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Randomization {
    Control,
    Treatment,
}

/// A course as returned by the API. Everything but the id is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub randomization: Option<Randomization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_rate_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preassessment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postassessment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pingpong_group_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preassessment_student_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postassessment_student_count: Option<u32>,
}

impl Keyed for Course {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Payload of `GET courses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Courses {
    pub courses: Vec<Course>,
}

/// Overall status of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Valid,
    Invalid,
    Missing,
    Error,
}

/// Token claims echoed back by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Instructor profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub academic_email: Option<String>,
    pub personal_email: Option<String>,
    pub honorarium_status: Option<String>,
    pub mailing_address: Option<String>,
    pub institution: Option<String>,
}

/// Feature flags scoped to the current instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub flags: HashMap<String, bool>,
}

/// Information about the current session, produced once per navigation by
/// the server. Consumed as data by routing code; never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub status: SessionStatus,
    pub error: Option<String>,
    pub token: Option<SessionToken>,
    pub instructor: Option<Instructor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_flags: Option<FeatureFlags>,
}

/// Generic response returned by write-style endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericStatus {
    pub status: String,
}

/// A pre-assessment submission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreAssessmentStudent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<bool>,
}

/// Reconciliation status of a post-assessment submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "PEND")]
    Pending,
    #[serde(rename = "NRC")]
    NotReconciled,
    #[serde(rename = "PRE")]
    PreOnly,
}

/// A post-assessment submission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAssessmentStudent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SubmissionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<bool>,
}

/// Payload of `GET preassessment/{courseId}/students`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentStudents {
    pub pre_assessment_submissions: Vec<PreAssessmentStudent>,
    pub post_assessment_submissions: Vec<PostAssessmentStudent>,
}

/// Request for logging in via magic link sent to email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicLoginRequest {
    pub email: String,
    pub forward: String,
}

/// Request for a login-as magic link sent to an admin email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAsRequest {
    pub instructor_email: String,
    pub admin_email: String,
    pub forward: String,
}
