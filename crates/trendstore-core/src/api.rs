//! Transport-neutral response envelopes.
//!
//! Engine results are wrapped in a small, serializable envelope so any
//! dispatch layer (CLI today, HTTP tomorrow) reports outcomes the same way:
//! a `success` flag, a human-readable `message`, an optional `data` payload,
//! and on failure an `error` kind separating what the caller can fix from
//! what the store broke. The split follows [`EngineError::is_validation`].

use serde::Serialize;

use crate::store::EngineError;

/// Failure class carried by failed envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Bad or missing caller input; the caller can fix and retry.
    Validation,
    /// Storage or engine failure.
    Store,
}

/// A uniform operation outcome for dispatch layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// Operation payload, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Failure class, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl ApiResponse {
    /// A successful outcome with no payload.
    pub fn ok(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// A successful outcome carrying a payload.
    pub fn ok_with(message: impl Into<String>, data: serde_json::Value) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    /// A failed outcome of the given class.
    pub fn failed(message: impl Into<String>, error: ErrorKind) -> Self {
        ApiResponse {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error),
        }
    }

    /// The HTTP-style status this outcome maps to: 200 on success, 400 for
    /// validation failures, 500 otherwise.
    pub fn status_code(&self) -> u16 {
        match (self.success, self.error) {
            (true, _) => 200,
            (false, Some(ErrorKind::Validation)) => 400,
            (false, _) => 500,
        }
    }
}

impl From<&EngineError> for ApiResponse {
    fn from(error: &EngineError) -> Self {
        let kind = if error.is_validation() {
            ErrorKind::Validation
        } else {
            ErrorKind::Store
        };
        ApiResponse::failed(error.to_string(), kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ValidationError;
    use serde_json::json;

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let bare = serde_json::to_value(ApiResponse::ok("done")).unwrap();
        assert_eq!(bare, json!({"success": true, "message": "done"}));

        let with = serde_json::to_value(ApiResponse::ok_with("done", json!([1, 2]))).unwrap();
        assert_eq!(with["data"], json!([1, 2]));
    }

    #[test]
    fn validation_failures_map_to_client_errors() {
        let validation: EngineError = ValidationError::MissingField {
            field: "SID".to_string(),
        }
        .into();
        let resp = ApiResponse::from(&validation);
        assert!(!resp.success);
        assert_eq!(resp.error, Some(ErrorKind::Validation));
        assert_eq!(resp.status_code(), 400);

        let rendered = serde_json::to_value(&resp).unwrap();
        assert_eq!(rendered["error"], json!("validation"));
    }

    #[test]
    fn success_maps_to_200() {
        assert_eq!(ApiResponse::ok("fine").status_code(), 200);
    }
}
