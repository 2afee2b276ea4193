//! Validation error recovery
//!
//! Validation failures are always handled in place: the user gets field-level
//! guidance and fixes the input, nothing is retried automatically.

use super::{RecoveryStrategy, StrategyPolicy};
use crate::config::ValidationStrategyConfig;
use crate::core_types::{
    ErrorType, ProcessedError, RecoveryData, RecoveryResult, UiAction, ValidationKind,
};
use crate::logging::log_debug;
use once_cell::sync::Lazy;
use regex::Regex;

static FIRST_NUMBER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\d+").ok());

const PASSWORD_SUGGESTIONS: &[&str] = &[
    "Use pelo menos 6 caracteres",
    "Inclua pelo menos uma letra maiúscula",
    "Inclua pelo menos uma letra minúscula",
    "Inclua pelo menos um número",
    "Inclua pelo menos um caractere especial",
];

#[derive(Debug)]
pub struct ValidationErrorStrategy {
    policy: StrategyPolicy,
}

impl Default for ValidationErrorStrategy {
    fn default() -> Self {
        Self::new(ValidationStrategyConfig::default())
    }
}

impl ValidationErrorStrategy {
    pub fn new(config: ValidationStrategyConfig) -> Self {
        Self {
            policy: config.policy(),
        }
    }

    /// Rule family for an error, structured payloads first.
    pub fn validation_kind(error: &ProcessedError) -> ValidationKind {
        if !error.field_errors().is_empty() {
            return ValidationKind::Structured;
        }

        let message = error.message_lower();
        let has = |needles: &[&str]| needles.iter().any(|needle| message.contains(needle));

        if has(&["required", "missing"]) {
            ValidationKind::Required
        } else if has(&["email", "e-mail"]) {
            ValidationKind::Email
        } else if has(&["password", "senha"]) {
            ValidationKind::Password
        } else if has(&["date", "data inválida"]) {
            ValidationKind::Date
        } else if has(&["number", "numeric"]) {
            ValidationKind::Numeric
        } else if has(&["length", "size"]) {
            ValidationKind::Length
        } else if has(&["format", "invalid"]) {
            ValidationKind::Format
        } else {
            ValidationKind::Generic
        }
    }

    fn structured(error: &ProcessedError) -> RecoveryResult {
        let field_errors = error.field_errors().to_vec();
        let mut data = RecoveryData::with_action(UiAction::HighlightValidationErrors)
            .user_message("Corrija os erros nos campos destacados.");
        data.suggestions = field_errors
            .iter()
            .map(|field| format!("{}: {}", field.field, field.message))
            .collect();
        data.field_errors = field_errors;
        Self::handled("Field validation errors reported", ValidationKind::Structured, data)
    }

    fn length(error: &ProcessedError) -> RecoveryResult {
        let required = FIRST_NUMBER
            .as_ref()
            .and_then(|pattern| pattern.find(&error.message))
            .map(|found| found.as_str().to_string());

        let copy = match required {
            Some(count) => format!("O campo deve ter {count} caracteres."),
            None => "Verifique o tamanho dos dados inseridos.".to_string(),
        };
        Self::handled(
            "Length validation failed",
            ValidationKind::Length,
            RecoveryData::with_action(UiAction::ShowLengthRequirements).user_message(copy),
        )
    }

    fn password(error: &ProcessedError) -> RecoveryResult {
        let message = error.message_lower();
        let copy = if ["short", "weak", "at least", "minimum"]
            .iter()
            .any(|needle| message.contains(needle))
        {
            "A senha deve ter pelo menos 6 caracteres."
        } else {
            "Verifique os requisitos da senha."
        };

        let mut data =
            RecoveryData::with_action(UiAction::ShowPasswordRequirements).user_message(copy);
        data.suggestions = PASSWORD_SUGGESTIONS.iter().map(ToString::to_string).collect();
        Self::handled("Password requirements not met", ValidationKind::Password, data)
    }

    fn handled(message: &str, kind: ValidationKind, mut data: RecoveryData) -> RecoveryResult {
        data.validation_kind = Some(kind);
        data.recoverable = true;
        RecoveryResult::handled(message, data)
    }
}

impl RecoveryStrategy for ValidationErrorStrategy {
    fn name(&self) -> &str {
        "ValidationErrorStrategy"
    }

    fn policy(&self) -> &StrategyPolicy {
        &self.policy
    }

    fn can_handle(&self, error: &ProcessedError) -> bool {
        error.error_type == ErrorType::Validation
    }

    fn execute(&self, error: &ProcessedError) -> RecoveryResult {
        let kind = Self::validation_kind(error);
        log_debug!(error_id = %error.id, validation_kind = ?kind, "Handling validation failure");

        match kind {
            ValidationKind::Structured => Self::structured(error),
            ValidationKind::Password => Self::password(error),
            ValidationKind::Length => Self::length(error),
            ValidationKind::Required => Self::handled(
                "Required fields missing",
                kind,
                RecoveryData::with_action(UiAction::HighlightRequiredFields)
                    .user_message("Preencha todos os campos obrigatórios."),
            ),
            ValidationKind::Email => Self::handled(
                "Invalid email address",
                kind,
                RecoveryData::with_action(UiAction::FocusEmailField).user_message(
                    "Insira um endereço de email válido (exemplo: usuario@dominio.com).",
                ),
            ),
            ValidationKind::Date => Self::handled(
                "Invalid date",
                kind,
                RecoveryData::with_action(UiAction::ShowDatePicker)
                    .user_message("Insira uma data válida no formato DD/MM/AAAA."),
            ),
            ValidationKind::Numeric => Self::handled(
                "Invalid number",
                kind,
                RecoveryData::with_action(UiAction::FormatNumericInput)
                    .user_message("Insira apenas números válidos."),
            ),
            ValidationKind::Format => Self::handled(
                "Invalid format",
                kind,
                RecoveryData::with_action(UiAction::ShowFormatHelp)
                    .user_message("Verifique o formato dos dados inseridos."),
            ),
            ValidationKind::Generic => {
                let mut data = RecoveryData::with_action(UiAction::ShowGenericValidationMessage)
                    .user_message("Verifique os dados inseridos e tente novamente.");
                data.original_message = Some(error.message.clone());
                Self::handled("Validation failed", kind, data)
            }
        }
    }
}
