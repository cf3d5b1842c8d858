//! Data-access core for the study web client.
//!
//! # Overview
//! Three pieces with real engineering content, leaf-first: a request
//! dispatcher that turns typed calls into [`HttpRequest`] values and raw
//! responses into [`Envelope`]s, a classifier/normalizer that sorts every
//! envelope into success, generic error, or field-validation error, and a
//! resource cache that deduplicates concurrent fetches and exposes the
//! result as reactive state. Everything else (routing, redirects,
//! rendering) lives outside this crate and reaches in only through the
//! injected [`Fetch`] transport, the typed DTOs, and cache subscriptions.
//!
//! # Design
//! - The crate performs no I/O of its own; the transport is injected per
//!   call so server-rendering and client-rendering contexts can each supply
//!   their own.
//! - Classification and normalization are pure and synchronous; the only
//!   suspension point is the transport call, which is what makes the
//!   cache's request coalescing safe under cooperative scheduling.
//! - Non-2xx statuses are data, not errors: only network-level transport
//!   failures surface as `Err` from the dispatcher.

pub mod cache;
pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod path;
pub mod request;
pub mod store;
pub mod types;

pub use cache::{ByIdView, CollectionCache, CollectionState, Keyed};
pub use envelope::{expand, explode, Envelope, ErrorDetail, Expanded, ValidationItem};
pub use error::{ApiError, LoadError, TransportError};
pub use http::{Credentials, Fetch, HttpRequest, HttpResponse, Method, RequestMode};
pub use path::{full_path, join};
pub use store::CourseStore;
pub use types::{
    AssessmentStudents, Course, CourseStatus, Courses, FeatureFlags, GenericStatus, Instructor,
    LoginAsRequest, MagicLoginRequest, PostAssessmentStudent, PreAssessmentStudent, Randomization,
    SessionState, SessionStatus, SessionToken, SubmissionStatus,
};
