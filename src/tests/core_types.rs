// Unit Tests for Core Error and Outcome Types
//
// UNIT UNDER TEST: RawError, ProcessedError, RecoveryResult, sanitize_message
//
// BUSINESS RESPONSIBILITY:
//   - Accepts whatever error shape the application raised without failing
//   - Masks credentials before messages reach logs or the UI
//   - Carries a stable identity and diagnostics for each processed error
//   - Exposes recovery outcomes in the wire shape the UI layer reads
//
// TEST COVERAGE:
//   - Lenient JSON extraction including nested field errors and junk input
//   - Credential masking and empty-message substitution
//   - Result constructors and serialized field names

use crate::core_types::{
    sanitize_message, ErrorContext, ErrorSeverity, ErrorType, FieldError, ProcessedError,
    RawError, RecoveryData, RecoveryResult, UiAction,
};
use serde_json::json;
use std::time::Duration;

#[cfg(test)]
mod raw_error_tests {
    use super::*;

    #[test]
    fn test_from_json_reads_flat_payload() {
        // Arrange
        let payload = json!({
            "message": "Request failed",
            "code": "ECONNREFUSED",
            "name": "AxiosError",
            "statusCode": 503
        });

        // Act
        let raw = RawError::from_json(&payload);

        // Assert
        assert_eq!(raw.message.as_deref(), Some("Request failed"));
        assert_eq!(raw.code.as_deref(), Some("ECONNREFUSED"));
        assert_eq!(raw.name.as_deref(), Some("AxiosError"));
        assert_eq!(raw.status, Some(503), "statusCode should be accepted as status");
    }

    #[test]
    fn test_from_json_finds_nested_validation_errors() {
        // Arrange
        let payload = json!({
            "message": "Invalid input",
            "technicalDetails": {
                "validationErrors": [
                    {"field": "email", "message": "must be an email", "value": "x"},
                    {"path": "age", "message": "must be positive"},
                    {"message": "no field name"}
                ]
            }
        });

        // Act
        let raw = RawError::from_json(&payload);

        // Assert
        assert_eq!(raw.validation_errors.len(), 2, "Entries without a field are skipped");
        assert_eq!(raw.validation_errors[0].field, "email");
        assert_eq!(raw.validation_errors[0].value, Some(json!("x")));
        assert_eq!(raw.validation_errors[1].field, "age");
    }

    #[test]
    fn test_from_json_tolerates_junk() {
        // Test verifies arbitrary payloads never fail extraction

        // Arrange
        let payloads = [
            json!(null),
            json!(42),
            json!([1, 2, 3]),
            json!({"message": 17, "status": "teapot", "validationErrors": "nope"}),
            json!({"status": 70000}),
        ];

        // Act & Assert
        for payload in &payloads {
            let raw = RawError::from_json(payload);
            assert!(raw.message.is_none(), "Unexpected message from {payload}");
            assert!(raw.status.is_none(), "Unexpected status from {payload}");
            assert!(raw.validation_errors.is_empty());
        }
    }

    #[test]
    fn test_from_json_string_becomes_message() {
        let raw = RawError::from_json(&json!("Network Error"));

        assert_eq!(raw.message_text(), "Network Error");
    }

    #[test]
    fn test_from_std_error_uses_display_text() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "operation timed out");

        let raw = RawError::from_std_error(&io);

        assert_eq!(raw.message_text(), "operation timed out");
    }
}

#[cfg(test)]
mod sanitize_message_tests {
    use super::*;

    #[test]
    fn test_credentials_are_masked() {
        // Arrange
        let message = "Login failed for password=hunter2&user=ana with token: abc.def";

        // Act
        let sanitized = sanitize_message(message);

        // Assert
        assert!(!sanitized.contains("hunter2"));
        assert!(!sanitized.contains("abc.def"));
        assert!(sanitized.contains("password=***"));
        assert!(sanitized.contains("token=***"));
        assert!(sanitized.contains("user=ana"), "Non-sensitive values are kept");
    }

    #[test]
    fn test_empty_message_becomes_unknown_error() {
        assert_eq!(sanitize_message(""), "Unknown error");
        assert_eq!(sanitize_message("   "), "Unknown error");
    }

    #[test]
    fn test_plain_message_is_unchanged() {
        assert_eq!(sanitize_message("Request timeout"), "Request timeout");
    }
}

#[cfg(test)]
mod processed_error_tests {
    use super::*;

    #[test]
    fn test_processed_error_captures_context_and_details() {
        // Arrange
        let raw = RawError::new("secret=abc failed")
            .with_code("aborted")
            .with_status(500)
            .with_validation_errors(vec![FieldError::new("name", "required")]);
        let context = ErrorContext::new("save patient")
            .with_component("PatientForm")
            .with_user_message("Não foi possível salvar o paciente.");

        // Act
        let error = ProcessedError::new(ErrorType::Database, ErrorSeverity::High, raw, &context);

        // Assert
        assert_eq!(error.message, "secret=*** failed");
        assert_eq!(error.context, "save patient");
        assert_eq!(error.component.as_deref(), Some("PatientForm"));
        assert_eq!(error.technical_details.error_code.as_deref(), Some("aborted"));
        assert_eq!(error.technical_details.status_code, Some(500));
        assert_eq!(error.field_errors().len(), 1);
        assert_eq!(error.code(), Some("aborted"));
        assert_eq!(
            error.original_error.message_text(),
            "secret=abc failed",
            "The original error is kept untouched for diagnostics"
        );
    }

    #[test]
    fn test_each_processed_error_gets_unique_id() {
        let context = ErrorContext::new("load");
        let first = ProcessedError::new(
            ErrorType::System,
            ErrorSeverity::High,
            RawError::default(),
            &context,
        );
        let second = ProcessedError::new(
            ErrorType::System,
            ErrorSeverity::High,
            RawError::default(),
            &context,
        );

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_correlation_key_defaults_to_action() {
        let implicit = ErrorContext::new("load agenda");
        let explicit = ErrorContext::new("load agenda").with_correlation_key("agenda-2024-05");

        assert_eq!(implicit.effective_correlation_key(), "load agenda");
        assert_eq!(explicit.effective_correlation_key(), "agenda-2024-05");
    }

    #[test]
    fn test_serialized_type_uses_screaming_snake_case() {
        let error = ProcessedError::new(
            ErrorType::BusinessLogic,
            ErrorSeverity::Medium,
            RawError::new("rule violated"),
            &ErrorContext::new("calculate invoice"),
        );

        let value = serde_json::to_value(&error).expect("processed error should serialize");

        assert_eq!(value["type"], json!("BUSINESS_LOGIC"));
        assert_eq!(value["severity"], json!("medium"));
    }
}

#[cfg(test)]
mod recovery_result_tests {
    use super::*;

    #[test]
    fn test_constructors_set_mutually_consistent_flags() {
        // Arrange & Act
        let handled = RecoveryResult::handled("ok", RecoveryData::default());
        let retryable =
            RecoveryResult::retryable("later", Duration::from_secs(3), RecoveryData::default());
        let terminal = RecoveryResult::terminal("stop", RecoveryData::default());

        // Assert
        assert!(handled.success && !handled.fallback_required && !handled.allows_retry());
        assert!(retryable.allows_retry());
        assert_eq!(retryable.retry_after(), Some(Duration::from_secs(3)));
        assert!(!terminal.success && terminal.fallback_required && !terminal.allows_retry());
        assert_eq!(terminal.retry_after_ms, None);
    }

    #[test]
    fn test_wire_shape_uses_camel_case_and_retry_after() {
        // Arrange
        let result = RecoveryResult::retryable(
            "Request timed out",
            Duration::from_millis(5_000),
            RecoveryData::with_action(UiAction::RetryOperation).user_message("Tentando novamente"),
        );

        // Act
        let value = serde_json::to_value(&result).expect("result should serialize");

        // Assert
        assert_eq!(value["retryAfter"], json!(5_000));
        assert_eq!(value["fallbackRequired"], json!(false));
        assert_eq!(value["data"]["action"], json!("retry_operation"));
        assert_eq!(value["data"]["userMessage"], json!("Tentando novamente"));
        assert!(
            value["data"].get("fieldErrors").is_none(),
            "Empty collections are omitted"
        );
    }
}
