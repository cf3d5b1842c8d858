//! HTTP transport types and the injected fetch boundary.
//!
//! # Design
//! The core never opens a socket. It builds [`HttpRequest`] values as plain
//! data and hands them to a caller-supplied [`Fetch`] implementation (the
//! browser-fetch contract), then interprets the returned [`HttpResponse`].
//! Server-rendering and client-rendering contexts each inject their own
//! transport; tests inject recording fakes.
//!
//! All fields use owned types so requests can be moved into futures without
//! lifetime concerns.

use futures::future::BoxFuture;

use crate::error::TransportError;

/// HTTP method for a request.
///
/// Methods split into two disjoint groups: query-style (`GET`, `DELETE`)
/// encode parameters in the URL, body-style (`POST`, `PUT`, `PATCH`) send a
/// JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    /// True for methods that carry parameters in the query string.
    pub fn uses_query_string(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }
}

/// Credential policy for a request, mirroring the fetch API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    Omit,
    SameOrigin,
    Include,
}

/// Request mode, mirroring the fetch API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    SameOrigin,
    Cors,
    NoCors,
}

/// An HTTP request described as plain data.
///
/// Built by the dispatcher in [`crate::request`]. The API and the web
/// client are served from different origins but share a session cookie, so
/// the dispatcher always sets `credentials: Include` and `mode: Cors`; a
/// conforming transport must honor both.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Origin-relative URL, e.g. `/api/study/courses?name=x`.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub credentials: Credentials,
    pub mode: RequestMode,
}

/// An HTTP response described as plain data.
///
/// Constructed by the transport after executing an [`HttpRequest`]. The
/// body is kept raw; JSON parsing (and its best-effort degrade) is the
/// dispatcher's job.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// The injected transport: anything that can execute an [`HttpRequest`].
///
/// Only network-level failures (DNS, connection refusal) surface as
/// [`TransportError`]; non-2xx statuses are data, not errors.
pub trait Fetch: Send + Sync {
    fn fetch(&self, request: HttpRequest) -> BoxFuture<'static, Result<HttpResponse, TransportError>>;
}

/// Any boxed-future closure with the right shape is a transport.
impl<F> Fetch for F
where
    F: Fn(HttpRequest) -> BoxFuture<'static, Result<HttpResponse, TransportError>> + Send + Sync,
{
    fn fetch(&self, request: HttpRequest) -> BoxFuture<'static, Result<HttpResponse, TransportError>> {
        (self)(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_strings_match_wire_names() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
        assert_eq!(Method::Put.as_str(), "PUT");
        assert_eq!(Method::Delete.as_str(), "DELETE");
        assert_eq!(Method::Patch.as_str(), "PATCH");
    }

    #[test]
    fn methods_partition_into_query_and_body_style() {
        assert!(Method::Get.uses_query_string());
        assert!(Method::Delete.uses_query_string());
        assert!(!Method::Post.uses_query_string());
        assert!(!Method::Put.uses_query_string());
        assert!(!Method::Patch.uses_query_string());
    }
}
