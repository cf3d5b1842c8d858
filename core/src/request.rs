//! The request dispatcher: one call, one envelope.
//!
//! # Design
//! [`send`] builds the full URL via [`crate::path`], encodes `data` either
//! as a query string (GET/DELETE) or a JSON body (POST/PUT/PATCH), executes
//! the injected transport, and parses whatever comes back into an
//! [`Envelope`]. Status codes are never inspected here (classification
//! belongs to [`crate::envelope`]) and non-2xx responses are not errors.
//! Only transport failures propagate as `Err`.
//!
//! Query parameters take the same round-trip as body data: serialize to
//! JSON first, so fields the caller skips (serde `None` + `skip_serializing_if`)
//! and explicit nulls are both dropped before encoding.

use serde::Serialize;
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{Credentials, Fetch, HttpRequest, Method, RequestMode};
use crate::path::full_path;

/// Dispatch one request and return the enveloped response.
pub async fn send<T: Serialize>(
    fetch: &dyn Fetch,
    method: Method,
    path: &str,
    data: Option<&T>,
) -> Result<Envelope, ApiError> {
    let mut url = full_path(path);
    let mut headers = Vec::new();
    let mut body = None;

    if let Some(data) = data {
        let value =
            serde_json::to_value(data).map_err(|e| ApiError::Serialization(e.to_string()))?;
        if method.uses_query_string() {
            url.push('?');
            url.push_str(&query_string(&value));
        } else {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
            body = Some(value.to_string());
        }
    }

    tracing::debug!(method = method.as_str(), %url, "dispatching request");

    let response = fetch
        .fetch(HttpRequest {
            method,
            url,
            headers,
            body,
            // Fixed policy: API and client live on different origins but
            // share a session cookie.
            credentials: Credentials::Include,
            mode: RequestMode::Cors,
        })
        .await?;

    Ok(Envelope::from_parts(response.status, &response.body))
}

/// Query with GET.
pub async fn get<T: Serialize>(
    fetch: &dyn Fetch,
    path: &str,
    data: Option<&T>,
) -> Result<Envelope, ApiError> {
    send(fetch, Method::Get, path, data).await
}

/// Query with DELETE.
pub async fn delete<T: Serialize>(
    fetch: &dyn Fetch,
    path: &str,
    data: Option<&T>,
) -> Result<Envelope, ApiError> {
    send(fetch, Method::Delete, path, data).await
}

/// Query with POST.
pub async fn post<T: Serialize>(
    fetch: &dyn Fetch,
    path: &str,
    data: Option<&T>,
) -> Result<Envelope, ApiError> {
    send(fetch, Method::Post, path, data).await
}

/// Query with PUT.
pub async fn put<T: Serialize>(
    fetch: &dyn Fetch,
    path: &str,
    data: Option<&T>,
) -> Result<Envelope, ApiError> {
    send(fetch, Method::Put, path, data).await
}

/// Query with PATCH.
pub async fn patch<T: Serialize>(
    fetch: &dyn Fetch,
    path: &str,
    data: Option<&T>,
) -> Result<Envelope, ApiError> {
    send(fetch, Method::Patch, path, data).await
}

/// Encode a JSON value as `key=value&...`, dropping null-valued keys and
/// string-coercing the rest. Non-object values encode as no parameters.
fn query_string(value: &Value) -> String {
    let Value::Object(map) = value else {
        return String::new();
    };
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let coerced = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!(
                "{}={}",
                urlencoding::encode(k),
                urlencoding::encode(&coerced)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use serde::Serialize;
    use serde_json::json;

    use crate::error::TransportError;
    use crate::http::HttpResponse;

    /// Transport fake that records every request and replays a canned
    /// response.
    struct Recorder {
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        status: u16,
        body: String,
    }

    impl Recorder {
        fn new(status: u16, body: &str) -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                status,
                body: body.to_string(),
            }
        }

        fn last(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Fetch for Recorder {
        fn fetch(
            &self,
            request: HttpRequest,
        ) -> BoxFuture<'static, Result<HttpResponse, TransportError>> {
            self.requests.lock().unwrap().push(request);
            let response = HttpResponse {
                status: self.status,
                body: self.body.clone(),
            };
            async move { Ok(response) }.boxed()
        }
    }

    #[derive(Serialize)]
    struct Enrollment {
        enrollment_count: u32,
    }

    #[tokio::test]
    async fn get_without_data_has_bare_url_and_no_body() {
        let transport = Recorder::new(200, r#"{"courses":[]}"#);
        let envelope = get::<()>(&transport, "courses", None).await.unwrap();

        let req = transport.last();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.url, "/api/study/courses");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
        assert_eq!(envelope.status, 200);
    }

    #[tokio::test]
    async fn patch_sends_json_body_with_content_type() {
        let transport = Recorder::new(200, r#"{"status":"ok"}"#);
        let data = Enrollment {
            enrollment_count: 42,
        };
        send(&transport, Method::Patch, "courses/abc/enrollment", Some(&data))
            .await
            .unwrap();

        let req = transport.last();
        assert_eq!(req.method, Method::Patch);
        assert_eq!(req.url, "/api/study/courses/abc/enrollment");
        assert_eq!(
            req.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"enrollment_count": 42}));
    }

    #[tokio::test]
    async fn post_and_put_are_body_style() {
        let transport = Recorder::new(200, "{}");

        post(&transport, "login/magic", Some(&json!({"email": "a@b"})))
            .await
            .unwrap();
        assert_eq!(transport.last().method, Method::Post);

        put(&transport, "courses/c-1", Some(&json!({"name": "Renamed"})))
            .await
            .unwrap();
        let req = transport.last();
        assert_eq!(req.method, Method::Put);
        assert_eq!(req.url, "/api/study/courses/c-1");
        assert!(req.body.is_some());
        assert_eq!(
            req.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[tokio::test]
    async fn every_request_includes_credentials_and_cors() {
        let transport = Recorder::new(200, "{}");
        get::<()>(&transport, "me", None).await.unwrap();
        let req = transport.last();
        assert_eq!(req.credentials, Credentials::Include);
        assert_eq!(req.mode, RequestMode::Cors);
    }

    #[tokio::test]
    async fn query_data_is_encoded_and_nulls_dropped() {
        #[derive(Serialize)]
        struct Filter {
            name: String,
            count: u32,
            active: bool,
            missing: Option<String>,
        }
        let transport = Recorder::new(200, "{}");
        let data = Filter {
            name: "a b".to_string(),
            count: 3,
            active: true,
            missing: None,
        };
        get(&transport, "courses", Some(&data)).await.unwrap();

        let req = transport.last();
        assert_eq!(req.url, "/api/study/courses?name=a%20b&count=3&active=true");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[tokio::test]
    async fn delete_uses_query_encoding() {
        let transport = Recorder::new(200, r#"{"status":"ok"}"#);
        delete(&transport, "preassessment/c1/students/s1", Some(&json!({"force": true})))
            .await
            .unwrap();
        let req = transport.last();
        assert_eq!(req.method, Method::Delete);
        assert_eq!(req.url, "/api/study/preassessment/c1/students/s1?force=true");
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn unparsable_body_degrades_to_empty_envelope() {
        let transport = Recorder::new(204, "");
        let envelope = get::<()>(&transport, "courses", None).await.unwrap();
        assert_eq!(envelope.status, 204);
        assert!(envelope.payload.is_empty());
    }

    #[tokio::test]
    async fn non_2xx_status_is_not_an_err() {
        let transport = Recorder::new(500, r#"{"detail":"server exploded"}"#);
        let envelope = get::<()>(&transport, "courses", None).await.unwrap();
        assert_eq!(envelope.status, 500);
        assert!(envelope.is_error_response());
    }

    #[tokio::test]
    async fn transport_failures_propagate() {
        let failing = |_request: HttpRequest| -> BoxFuture<'static, Result<HttpResponse, TransportError>> {
            async { Err(TransportError::new("connection refused")) }.boxed()
        };
        let err = get::<()>(&failing, "courses", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
