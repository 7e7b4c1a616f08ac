use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Duplicate (attribute, locale, channel) triple. Detected from known
    /// backend error payload shapes and surfaced distinctly so the UI can
    /// show "this value already exists" instead of a generic failure.
    #[error("this value already exists for this attribute, locale and channel")]
    Conflict { detail: Option<String> },
    #[error("not found")]
    NotFound,
    #[error("backend returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("failed to decode backend response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict { .. })
    }

    /// Whether a read may be retried: transport failures only, never a
    /// response the backend actually produced.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Map an error response to a typed error, inspecting the payload for the
/// backend's uniqueness shapes: a `code` of `unique`/`unique_together`, or a
/// `non_field_errors`/`detail` message mentioning uniqueness.
pub fn classify_error(status: u16, body: &str) -> ApiError {
    if status == 404 {
        return ApiError::NotFound;
    }
    if status == 400 || status == 409 {
        if let Ok(payload) = serde_json::from_str::<serde_json::Value>(body) {
            if payload_mentions_uniqueness(&payload) {
                return ApiError::Conflict {
                    detail: Some(body.to_string()),
                };
            }
        }
    }
    ApiError::Http {
        status,
        message: body.to_string(),
    }
}

fn payload_mentions_uniqueness(payload: &serde_json::Value) -> bool {
    if let Some(code) = payload.get("code").and_then(|c| c.as_str()) {
        if code == "unique" || code == "unique_together" {
            return true;
        }
    }
    let mut messages: Vec<&str> = Vec::new();
    if let Some(detail) = payload.get("detail").and_then(|d| d.as_str()) {
        messages.push(detail);
    }
    if let Some(errors) = payload.get("non_field_errors").and_then(|e| e.as_array()) {
        messages.extend(errors.iter().filter_map(|m| m.as_str()));
    }
    messages
        .iter()
        .any(|m| m.to_lowercase().contains("unique") || m.to_lowercase().contains("already exists"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_code_maps_to_conflict() {
        let e = classify_error(400, r#"{"code": "unique_together"}"#);
        assert!(e.is_conflict());
    }

    #[test]
    fn non_field_errors_message_maps_to_conflict() {
        let body = r#"{"non_field_errors": ["The fields attribute, locale, channel must make a unique set."]}"#;
        assert!(classify_error(400, body).is_conflict());
    }

    #[test]
    fn unrelated_bad_request_stays_http() {
        let e = classify_error(400, r#"{"detail": "value is not a number"}"#);
        assert!(matches!(e, ApiError::Http { status: 400, .. }));
    }

    #[test]
    fn missing_resource_maps_to_not_found() {
        assert!(matches!(classify_error(404, ""), ApiError::NotFound));
    }
}
