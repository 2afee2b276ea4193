//! Recovery outcomes handed back to the caller and, through it, to the UI.

use super::errors::ErrorSeverity;
use super::processed::FieldError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// UI directive the caller must interpret. The engine never renders anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiAction {
    ShowLoginForm,
    RedirectToLogin,
    RefreshToken,
    RetryAuth,
    RetryOperation,
    ShowServiceUnavailable,
    CheckConnection,
    HighlightValidationErrors,
    HighlightRequiredFields,
    ShowFormatHelp,
    ShowLengthRequirements,
    FocusEmailField,
    ShowPasswordRequirements,
    ShowDatePicker,
    FormatNumericInput,
    ShowGenericValidationMessage,
    ShowCriticalErrorPage,
    ShowErrorWithOptions,
    ShowRecoverableError,
    ShowGentleNotification,
}

/// Guided follow-up offered to the user alongside a fallback screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackOption {
    RetryOperation,
    RefreshPage,
    GoBack,
    ContactSupport,
    TrySafeMode,
    TryAlternativeMethod,
    ContinueAnyway,
    LoginAgain,
    RefreshToken,
    ContactAdmin,
    CheckPermissions,
    FixValidationErrors,
    ResetForm,
    GetHelp,
    CheckConnection,
    WorkOffline,
    ReviewData,
    TryAlternative,
    CheckSettings,
    UseDefaults,
}

/// Which validation rule family produced the guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Structured,
    Required,
    Email,
    Password,
    Date,
    Numeric,
    Length,
    Format,
    Generic,
}

/// Sub-classification of a network failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkFailureKind {
    Timeout,
    Connection,
    Dns,
    Generic,
}

/// Free-form payload for the UI layer.
///
/// Everything is optional; strategies fill what they know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<UiAction>,
    /// Localized, user-facing copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_options: Vec<FallbackOption>,
    /// Timeout the caller should use when retrying, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<ErrorSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_kind: Option<ValidationKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_failure: Option<NetworkFailureKind>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub circuit_breaker_open: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_support: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub recoverable: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dismissible: bool,
    /// Original (sanitized) message, echoed for generic validation notices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_message: Option<String>,
}

impl RecoveryData {
    pub fn with_action(action: UiAction) -> Self {
        Self {
            action: Some(action),
            ..Self::default()
        }
    }

    pub fn user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }
}

/// Outcome of one recovery attempt.
///
/// `success` means the caller may treat the error as handled for the user,
/// not that the original operation succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryResult {
    pub success: bool,
    /// Diagnostic message, not user-facing.
    pub message: String,
    /// Delay before the caller may retry the original operation, in milliseconds.
    #[serde(rename = "retryAfter", default, skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
    /// No further automated recovery is possible; the UI must take over.
    pub fallback_required: bool,
    #[serde(default)]
    pub data: RecoveryData,
}

impl RecoveryResult {
    /// Handled: the user gets guidance and can continue.
    pub fn handled(message: impl Into<String>, data: RecoveryData) -> Self {
        Self {
            success: true,
            message: message.into(),
            retry_after_ms: None,
            fallback_required: false,
            data,
        }
    }

    /// Not resolved yet, but the original operation may be retried after `retry_after`.
    pub fn retryable(
        message: impl Into<String>,
        retry_after: Duration,
        data: RecoveryData,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            retry_after_ms: Some(duration_ms(retry_after)),
            fallback_required: false,
            data,
        }
    }

    /// Terminal: no automated path is left.
    pub fn terminal(message: impl Into<String>, data: RecoveryData) -> Self {
        Self {
            success: false,
            message: message.into(),
            retry_after_ms: None,
            fallback_required: true,
            data,
        }
    }

    /// Retry delay as a [`Duration`].
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after_ms.map(Duration::from_millis)
    }

    /// The caller may schedule a retry of the original operation.
    pub fn allows_retry(&self) -> bool {
        !self.success && !self.fallback_required
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
