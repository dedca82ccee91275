use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::validation::FieldErrors;

/// `{success, message, data?, error?, errors?}` wrapper used by mutating and structured endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
            errors: None,
        }
    }

    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
            errors: None,
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error: None,
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error: Some(error.into()),
            errors: None,
        }
    }

    pub fn invalid(message: impl Into<String>, errors: &FieldErrors) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error: Some(errors.summary()),
            errors: Some(errors.as_map().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_members_are_omitted() {
        let body = serde_json::to_value(Envelope::ok("done", json!({ "id": 1 }))).unwrap();
        assert_eq!(
            body,
            json!({ "success": true, "message": "done", "data": { "id": 1 } })
        );

        let body = serde_json::to_value(Envelope::failure("nope", "broken")).unwrap();
        assert_eq!(
            body,
            json!({ "success": false, "message": "nope", "error": "broken" })
        );
    }

    #[test]
    fn invalid_envelopes_carry_field_detail() {
        let mut errors = FieldErrors::default();
        errors.add("phone", "Phone number must be at least 8 digits.");
        let body = serde_json::to_value(Envelope::invalid("Failed", &errors)).unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(
            body["errors"]["phone"],
            json!(["Phone number must be at least 8 digits."])
        );
        assert_eq!(
            body["error"],
            json!("phone: Phone number must be at least 8 digits.")
        );
    }
}
