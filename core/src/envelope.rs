//! Response envelope: classification and normalization.
//!
//! # Design
//! Every response becomes an [`Envelope`]: the HTTP status plus the parsed
//! body merged at the top level. Classification is a three-way fallback
//! expressed as explicit decode attempts rather than property probing:
//! try the validation shape first (422 + structured `detail` list), then
//! generic error (status >= 400), else success. A 422 whose `detail` does
//! not match the validation shape falls through to generic error.
//!
//! The two normalizers share that classification and differ only in how an
//! error surfaces: [`expand`] returns it as a field, [`explode`] returns it
//! as `Err`. Both are pure and deterministic.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Status code 422, the only one eligible for the validation shape.
const UNPROCESSABLE_ENTITY: u16 = 422;

/// The wire-level shape of every response: HTTP status plus the payload
/// fields at the top level (no nesting under a `body` key).
///
/// Invariant: `status >= 400` always means the payload is an error, never
/// success data.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub status: u16,
    pub payload: Map<String, Value>,
}

/// One entry of a validation error's `detail` list.
///
/// Only `type` and `msg` are required; `loc` defaults to empty. This lax
/// acceptance is deliberate: requiring `loc` would silently reclassify
/// some 422 payloads as generic errors and change their rendered message.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationItem {
    #[serde(default)]
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Generic error payload: `{ detail?: string }`. For validation errors the
/// `detail` holds the synthesized multi-line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub detail: Option<String>,
}

/// Result of [`expand`]: always a status plus exactly one of `error`/`data`.
#[derive(Debug, Clone)]
pub struct Expanded<R> {
    pub status: u16,
    pub error: Option<ErrorDetail>,
    pub data: Option<R>,
}

impl Envelope {
    /// Build an envelope from an HTTP status and a raw body.
    ///
    /// Any body that is not a JSON object (empty, non-JSON, JSON scalar or
    /// array) degrades to an empty payload; absence of a parsable body is
    /// an empty success, not an error.
    pub fn from_parts(status: u16, body: &str) -> Self {
        let payload = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                tracing::warn!(status, body_kind = ?other, "non-object response body, degrading to empty payload");
                Map::new()
            }
            Err(_) => {
                if !body.is_empty() {
                    tracing::warn!(status, "unparsable response body, degrading to empty payload");
                }
                Map::new()
            }
        };
        Self { status, payload }
    }

    /// True iff this envelope represents any error (generic or validation).
    pub fn is_error_response(&self) -> bool {
        self.status >= 400
    }

    /// True iff this is a 422 whose `detail` is a list where every element
    /// carries non-empty `type` and `msg`.
    ///
    /// Call sites must check this before (or independently of)
    /// [`is_error_response`]: the generic check is a superset and cannot
    /// distinguish the richer payload.
    pub fn is_validation_error(&self) -> bool {
        self.validation_items().is_some()
    }

    /// Decode the validation shape, or `None` if it does not apply.
    fn validation_items(&self) -> Option<Vec<ValidationItem>> {
        if self.status != UNPROCESSABLE_ENTITY {
            return None;
        }
        let detail = self.payload.get("detail")?;
        let items: Vec<ValidationItem> = serde_json::from_value(detail.clone()).ok()?;
        if items.is_empty() {
            return None;
        }
        if items.iter().all(|item| !item.kind.is_empty() && !item.msg.is_empty()) {
            Some(items)
        } else {
            None
        }
    }

    /// The generic error payload's `detail` string, if the server sent one.
    fn detail_string(&self) -> Option<String> {
        match self.payload.get("detail") {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Render one `Error at <loc joined by " -> ">: <msg>` line per item,
/// joined with newlines, preserving item order.
fn validation_message(items: &[ValidationItem]) -> String {
    items
        .iter()
        .map(|item| format!("Error at {}: {}", item.loc.join(" -> "), item.msg))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Expand an envelope into its error and data components.
///
/// Exactly one of `error`/`data` is set. Returns `Err` only when a success
/// payload fails to decode into `R`.
pub fn expand<R: DeserializeOwned>(envelope: Envelope) -> Result<Expanded<R>, ApiError> {
    let status = envelope.status;
    if let Some(items) = envelope.validation_items() {
        return Ok(Expanded {
            status,
            error: Some(ErrorDetail {
                detail: Some(validation_message(&items)),
            }),
            data: None,
        });
    }
    if envelope.is_error_response() {
        return Ok(Expanded {
            status,
            error: Some(ErrorDetail {
                detail: envelope.detail_string(),
            }),
            data: None,
        });
    }
    let data = decode_payload(envelope.payload)?;
    Ok(Expanded {
        status,
        error: None,
        data: Some(data),
    })
}

/// Return the decoded success payload, or the classified error.
///
/// Validation errors surface as [`ApiError::Validation`] with the
/// synthesized message; any other status >= 400 as [`ApiError::Api`] with
/// the raw `detail`.
pub fn explode<R: DeserializeOwned>(envelope: Envelope) -> Result<R, ApiError> {
    let status = envelope.status;
    if let Some(items) = envelope.validation_items() {
        return Err(ApiError::Validation {
            status,
            message: validation_message(&items),
        });
    }
    if envelope.is_error_response() {
        return Err(ApiError::Api {
            status,
            detail: envelope.detail_string(),
        });
    }
    decode_payload(envelope.payload)
}

fn decode_payload<R: DeserializeOwned>(payload: Map<String, Value>) -> Result<R, ApiError> {
    serde_json::from_value(Value::Object(payload))
        .map_err(|e| ApiError::Deserialization(e.to_string()))
}
