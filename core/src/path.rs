//! URL path assembly for the study API.
//!
//! # Design
//! Pure string manipulation, total for any input (empty segments included).
//! Every relative path in this crate is mounted under the fixed
//! [`API_ROOT`]; the transport prepends the host.

/// Root under which every study API route is mounted.
pub const API_ROOT: &str = "/api/study/";

/// Join path segments with exactly one `/` between non-empty segments.
///
/// Leading slashes on subsequent segments are stripped, so
/// `join(&["a/", "/b"])` and `join(&["a", "b"])` both yield `"a/b"`.
pub fn join(parts: &[&str]) -> String {
    let mut full = String::new();
    for part in parts {
        if full.is_empty() {
            full.push_str(part);
        } else {
            if !full.ends_with('/') {
                full.push('/');
            }
            full.push_str(part.trim_start_matches('/'));
        }
    }
    full
}

/// Get the full API route for a relative path.
pub fn full_path(path: &str) -> String {
    join(&[API_ROOT, path])
}
