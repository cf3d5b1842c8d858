//! Course store: the cached course collection.
//!
//! # Design
//! Wires the generic [`CollectionCache`] to the course pipeline: dispatch
//! `GET courses`, explode the envelope, extract the list. One store
//! instance lives for the whole client session; pages and components share
//! it and subscribe to its state.

use std::sync::Arc;

use tokio::sync::watch;

use crate::cache::{ByIdView, CollectionCache, CollectionState};
use crate::client;
use crate::envelope::explode;
use crate::error::LoadError;
use crate::http::Fetch;
use crate::types::{Course, Courses};

/// Message recorded when a course fetch fails without a detail of its own.
const LOAD_FAILED: &str = "Failed to load courses";

/// Shared, reactive cache of the current user's courses.
#[derive(Clone)]
pub struct CourseStore {
    cache: CollectionCache<Course>,
}

impl Default for CourseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CourseStore {
    pub fn new() -> Self {
        Self {
            cache: CollectionCache::new(LOAD_FAILED),
        }
    }

    /// Ensure courses are loaded. Deduplicates concurrent calls and caches
    /// the result; after a successful load no further network calls are
    /// made for the lifetime of the store.
    pub async fn ensure_courses(
        &self,
        fetch: Arc<dyn Fetch>,
    ) -> Result<Arc<Vec<Course>>, LoadError> {
        self.cache
            .ensure_loaded(move || async move {
                let envelope = client::get_my_courses(fetch.as_ref()).await?;
                let listing: Courses = explode(envelope)?;
                Ok(listing.courses)
            })
            .await
    }

    /// Snapshot lookup of a course by id over whatever is cached.
    pub fn get_course_by_id(&self, id: &str) -> Option<Course> {
        self.cache.get_by_id(id)
    }

    /// Reactive view of one course by id.
    pub fn course_by_id(&self, id: &str) -> ByIdView<Course> {
        self.cache.by_id(id)
    }

    /// Subscribe to course-collection state changes.
    pub fn subscribe(&self) -> watch::Receiver<CollectionState<Course>> {
        self.cache.subscribe()
    }

    /// Current state snapshot (items, loaded/loading flags, last error).
    pub fn snapshot(&self) -> CollectionState<Course> {
        self.cache.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use futures::future::BoxFuture;
    use futures::FutureExt;

    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};

    /// Transport fake serving a fixed course list and counting calls.
    struct CannedCourses {
        calls: AtomicUsize,
        status: u16,
        body: String,
    }

    impl CannedCourses {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                status,
                body: body.to_string(),
            })
        }
    }

    impl Fetch for CannedCourses {
        fn fetch(
            &self,
            _request: HttpRequest,
        ) -> BoxFuture<'static, Result<HttpResponse, TransportError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let response = HttpResponse {
                status: self.status,
                body: self.body.clone(),
            };
            async move { Ok(response) }.boxed()
        }
    }

    const TWO_COURSES: &str =
        r#"{"courses":[{"id":"c-1","name":"Intro"},{"id":"c-2","name":"Advanced"}]}"#;

    #[tokio::test]
    async fn ensure_courses_loads_and_caches() {
        let store = CourseStore::new();
        let transport = CannedCourses::new(200, TWO_COURSES);

        let courses = store
            .ensure_courses(transport.clone() as Arc<dyn Fetch>)
            .await
            .unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].id, "c-1");

        // Second call is served from cache.
        let again = store
            .ensure_courses(transport.clone() as Arc<dyn Fetch>)
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&courses, &again));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn lookup_helpers_see_the_loaded_collection() {
        let store = CourseStore::new();
        let transport = CannedCourses::new(200, TWO_COURSES);
        let mut view = store.course_by_id("c-2");
        assert!(view.get().is_none());

        store
            .ensure_courses(transport as Arc<dyn Fetch>)
            .await
            .unwrap();

        assert_eq!(
            store.get_course_by_id("c-2").unwrap().name.as_deref(),
            Some("Advanced")
        );
        assert!(store.get_course_by_id("nope").is_none());
        assert_eq!(view.get().unwrap().name.as_deref(), Some("Advanced"));
    }

    #[tokio::test]
    async fn api_error_detail_becomes_the_store_error() {
        let store = CourseStore::new();
        let transport = CannedCourses::new(503, r#"{"detail":"maintenance window"}"#);

        let err = store
            .ensure_courses(transport as Arc<dyn Fetch>)
            .await
            .unwrap_err();
        assert_eq!(err.message, "maintenance window");
        assert_eq!(
            store.snapshot().error.as_deref(),
            Some("maintenance window")
        );
        assert!(!store.snapshot().loaded);
    }

    #[tokio::test]
    async fn missing_detail_falls_back_to_fixed_message() {
        let store = CourseStore::new();
        let transport = CannedCourses::new(500, "");

        let err = store
            .ensure_courses(transport as Arc<dyn Fetch>)
            .await
            .unwrap_err();
        assert_eq!(err.message, "Failed to load courses");
    }

    /// Transport whose responses are handed out one per call, so a retry
    /// after failure can succeed.
    struct Scripted {
        responses: Mutex<Vec<HttpResponse>>,
    }

    impl Fetch for Scripted {
        fn fetch(
            &self,
            _request: HttpRequest,
        ) -> BoxFuture<'static, Result<HttpResponse, TransportError>> {
            let response = self.responses.lock().unwrap().remove(0);
            async move { Ok(response) }.boxed()
        }
    }

    #[tokio::test]
    async fn failed_load_can_be_retried() {
        let store = CourseStore::new();
        let transport = Arc::new(Scripted {
            responses: Mutex::new(vec![
                HttpResponse {
                    status: 500,
                    body: r#"{"detail":"transient"}"#.to_string(),
                },
                HttpResponse {
                    status: 200,
                    body: TWO_COURSES.to_string(),
                },
            ]),
        });

        let err = store
            .ensure_courses(transport.clone() as Arc<dyn Fetch>)
            .await
            .unwrap_err();
        assert_eq!(err.message, "transient");

        let courses = store
            .ensure_courses(transport as Arc<dyn Fetch>)
            .await
            .unwrap();
        assert_eq!(courses.len(), 2);
        assert!(store.snapshot().loaded);
    }
}
