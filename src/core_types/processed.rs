//! Inbound error shapes and the normalized [`ProcessedError`].
//!
//! Every [`RawError`] field is optional; it holds whatever the HTTP client,
//! auth SDK or form layer raised.

use super::errors::{ErrorSeverity, ErrorType};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

static SENSITIVE_VALUE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\b(password|token|key|secret)\s*[=:]\s*[^\s&]+").ok());

/// A single per-field validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name (or path) as reported by the form/backend.
    #[serde(alias = "path")]
    pub field: String,
    /// Human-readable reason.
    pub message: String,
    /// Offending value, when the source reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = object
            .get("field")
            .or_else(|| object.get("path"))
            .and_then(Value::as_str)?
            .to_string();
        let message = object
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Self {
            field,
            message,
            value: object.get("value").cloned(),
        })
    }
}

/// An error as raised by the surrounding application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawError {
    #[serde(default)]
    pub message: Option<String>,
    /// Platform error code, e.g. `auth/wrong-password` or `ECONNREFUSED`.
    #[serde(default)]
    pub code: Option<String>,
    /// Error class name, e.g. `FirebaseError`.
    #[serde(default)]
    pub name: Option<String>,
    /// HTTP status when the error came from an API call.
    #[serde(default, alias = "statusCode")]
    pub status: Option<u16>,
    #[serde(default)]
    pub validation_errors: Vec<FieldError>,
}

impl RawError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Error identified only by its platform code.
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_validation_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.validation_errors = errors;
        self
    }

    /// Capture a Rust error by its display text.
    pub fn from_std_error(error: &(dyn std::error::Error + 'static)) -> Self {
        Self::new(error.to_string())
    }

    /// Leniently extract an error from an arbitrary JSON payload.
    ///
    /// Accepts `{message, code, name, status|statusCode, validationErrors}`,
    /// with field errors optionally nested under `technicalDetails` or
    /// `details`. A bare string becomes the message. Anything else (null,
    /// numbers, wrongly typed fields) is ignored rather than rejected.
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return match value.as_str() {
                Some(message) => Self::new(message),
                None => Self::default(),
            };
        };

        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        let status = object
            .get("status")
            .or_else(|| object.get("statusCode"))
            .and_then(Value::as_u64)
            .and_then(|status| u16::try_from(status).ok());

        let validation_errors = ["validationErrors", "validation_errors"]
            .iter()
            .find_map(|key| {
                object.get(*key).or_else(|| {
                    ["technicalDetails", "details"]
                        .iter()
                        .find_map(|outer| object.get(*outer).and_then(|details| details.get(*key)))
                })
            })
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(FieldError::from_value).collect())
            .unwrap_or_default();

        Self {
            message: text("message"),
            code: text("code"),
            name: text("name"),
            status,
            validation_errors,
        }
    }

    /// Message text, empty when absent.
    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

/// What the caller was doing when the error was raised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Logical action, e.g. `"login"` or `"save product"`.
    pub action: String,
    /// UI/service component that raised the error.
    #[serde(default)]
    pub component: Option<String>,
    /// Groups retry attempts of the same logical operation.
    #[serde(default)]
    pub correlation_key: Option<String>,
    /// Caller flag: the failing path protects data integrity.
    #[serde(default)]
    pub data_integrity: bool,
    /// Pre-localized hint supplied by the caller.
    #[serde(default)]
    pub user_message: Option<String>,
}

impl ErrorContext {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with_correlation_key(mut self, key: impl Into<String>) -> Self {
        self.correlation_key = Some(key.into());
        self
    }

    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }

    /// Mark the failing path as guarding data integrity.
    pub fn flag_data_integrity(mut self) -> Self {
        self.data_integrity = true;
        self
    }

    /// Explicit correlation key, or the action when none was supplied.
    pub fn effective_correlation_key(&self) -> &str {
        self.correlation_key.as_deref().unwrap_or(&self.action)
    }
}

/// Structured diagnostics captured alongside a processed error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalDetails {
    pub error_code: Option<String>,
    pub error_name: Option<String>,
    pub status_code: Option<u16>,
    pub validation_errors: Vec<FieldError>,
    pub captured_at: DateTime<Utc>,
}

/// Normalized error, produced once by the classifier and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedError {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub severity: ErrorSeverity,
    /// Original message with credentials masked.
    pub message: String,
    pub original_error: RawError,
    pub technical_details: TechnicalDetails,
    /// Logical action being attempted; used for message selection only.
    pub context: String,
    pub component: Option<String>,
    pub user_message: Option<String>,
}

impl ProcessedError {
    pub fn new(
        error_type: ErrorType,
        severity: ErrorSeverity,
        original_error: RawError,
        context: &ErrorContext,
    ) -> Self {
        let technical_details = TechnicalDetails {
            error_code: original_error.code.clone(),
            error_name: original_error.name.clone(),
            status_code: original_error.status,
            validation_errors: original_error.validation_errors.clone(),
            captured_at: Utc::now(),
        };

        Self {
            id: Uuid::new_v4(),
            error_type,
            severity,
            message: sanitize_message(original_error.message_text()),
            original_error,
            technical_details,
            context: context.action.clone(),
            component: context.component.clone(),
            user_message: context.user_message.clone(),
        }
    }

    /// Lowercased original message for keyword matching.
    pub fn message_lower(&self) -> String {
        self.original_error.message_text().to_lowercase()
    }

    /// Platform error code, if any.
    pub fn code(&self) -> Option<&str> {
        self.original_error.code.as_deref()
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.technical_details.validation_errors
    }
}

/// Mask credential-looking values so messages are safe to log and display.
pub fn sanitize_message(message: &str) -> String {
    if message.trim().is_empty() {
        return "Unknown error".to_string();
    }
    match SENSITIVE_VALUE.as_ref() {
        Some(regex) => regex.replace_all(message, "${1}=***").into_owned(),
        None => message.to_string(),
    }
}
