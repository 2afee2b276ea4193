// Unit Tests for Engine Error Handling
//
// UNIT UNDER TEST: EngineError
//
// BUSINESS RESPONSIBILITY:
//   - Reports misuse of the engine (bad config, duplicate strategies, retry scheduling)
//   - Distinguishes transient conditions the caller may simply retry
//   - Logs errors at creation with structured context
//
// TEST COVERAGE:
//   - Constructor functions preserve context in the variant
//   - Display messages include the identifying key or name
//   - Transient classification

use crate::error::EngineError;

#[cfg(test)]
mod engine_error_tests {
    use super::*;

    #[test]
    fn test_configuration_error_preserves_message() {
        // Arrange
        let message = "failure_threshold must be at least 1";

        // Act
        let error = EngineError::configuration_error(message);

        // Assert
        assert!(matches!(&error, EngineError::Configuration { message: m } if m == message));
        assert!(error.to_string().contains(message));
        assert!(!error.is_transient(), "Configuration errors are permanent");
    }

    #[test]
    fn test_duplicate_strategy_names_the_strategy() {
        let error = EngineError::duplicate_strategy("AuthErrorStrategy");

        assert_eq!(
            error.to_string(),
            "Recovery strategy already registered: AuthErrorStrategy"
        );
        assert!(!error.is_transient());
    }

    #[test]
    fn test_retry_in_flight_is_transient() {
        // Test verifies an overlapping retry can be attempted again later

        // Act
        let error = EngineError::retry_in_flight("save-product-42");

        // Assert
        assert!(error.is_transient(), "A pending retry finishes on its own");
        assert!(error.to_string().contains("save-product-42"));
    }

    #[test]
    fn test_retry_failures_are_not_transient() {
        let cancelled = EngineError::retry_cancelled("upload");
        let failed = EngineError::retry_failed("upload", "task panicked");

        assert!(!cancelled.is_transient());
        assert!(!failed.is_transient());
        assert!(failed.to_string().contains("task panicked"));
    }
}
