//! Catch-all recovery by severity
//!
//! Accepts every error, so the dispatcher always has an answer. Critical and
//! high severities end in a terminal screen; medium and low ones leave the
//! user able to continue.

use super::{RecoveryStrategy, StrategyPolicy};
use crate::config::FallbackStrategyConfig;
use crate::core_types::{
    ErrorSeverity, ErrorType, FallbackOption, ProcessedError, RecoveryData, RecoveryResult,
    UiAction,
};
use crate::logging::log_info;

/// User copy keyed by words found in the caller's action.
const ACTION_MESSAGES: &[(&str, &str)] = &[
    ("login", "Não foi possível fazer login. Verifique suas credenciais."),
    ("save", "Não foi possível salvar os dados. Tente novamente."),
    ("load", "Não foi possível carregar os dados. Atualize a página."),
    ("delete", "Não foi possível excluir o item. Tente novamente."),
    ("update", "Não foi possível atualizar os dados. Verifique as informações."),
    ("create", "Não foi possível criar o item. Verifique os dados inseridos."),
    ("search", "Não foi possível realizar a busca. Tente novamente."),
    ("upload", "Não foi possível fazer upload do arquivo. Verifique o formato."),
    ("download", "Não foi possível baixar o arquivo. Tente novamente."),
];

#[derive(Debug)]
pub struct FallbackStrategy {
    policy: StrategyPolicy,
}

impl Default for FallbackStrategy {
    fn default() -> Self {
        Self::new(FallbackStrategyConfig::default())
    }
}

impl FallbackStrategy {
    pub fn new(config: FallbackStrategyConfig) -> Self {
        Self {
            policy: config.policy(),
        }
    }

    /// Guided follow-ups appropriate for an error family.
    pub fn fallback_options(error_type: ErrorType) -> Vec<FallbackOption> {
        use FallbackOption::*;
        match error_type {
            ErrorType::Authentication => vec![LoginAgain, RefreshToken, ContactSupport],
            ErrorType::Authorization => vec![ContactAdmin, CheckPermissions, GoBack],
            ErrorType::Validation => vec![FixValidationErrors, ResetForm, GetHelp],
            ErrorType::Network => vec![CheckConnection, RetryOperation, WorkOffline],
            ErrorType::Database => vec![RetryOperation, RefreshPage, ContactSupport],
            ErrorType::BusinessLogic => vec![ReviewData, TryAlternative, ContactSupport],
            ErrorType::Configuration => vec![ContactAdmin, CheckSettings, UseDefaults],
            ErrorType::System => vec![RetryOperation, RefreshPage, ContactSupport],
        }
    }

    /// Localized copy for an error: caller hint, then action keyword, then type default.
    pub fn user_message(error: &ProcessedError) -> String {
        if let Some(hint) = error.user_message.as_deref().filter(|hint| !hint.trim().is_empty()) {
            return hint.to_string();
        }

        let action = error.context.to_lowercase();
        if let Some((_, message)) = ACTION_MESSAGES
            .iter()
            .find(|(keyword, _)| action.contains(keyword))
        {
            return (*message).to_string();
        }

        match error.error_type {
            ErrorType::Authentication => "Erro de autenticação. Verifique suas credenciais.",
            ErrorType::Authorization => "Você não tem permissão para realizar esta ação.",
            ErrorType::Validation => "Dados inválidos. Verifique os campos preenchidos.",
            ErrorType::Network => "Erro de conexão. Verifique sua internet.",
            ErrorType::Database => "Erro no sistema. Tente novamente em alguns instantes.",
            ErrorType::BusinessLogic => "Não foi possível processar a solicitação.",
            ErrorType::Configuration => "Erro de configuração do sistema.",
            ErrorType::System => "Erro interno do sistema. Tente novamente.",
        }
        .to_string()
    }
}

impl RecoveryStrategy for FallbackStrategy {
    fn name(&self) -> &str {
        "FallbackStrategy"
    }

    fn policy(&self) -> &StrategyPolicy {
        &self.policy
    }

    fn can_handle(&self, _error: &ProcessedError) -> bool {
        true
    }

    fn execute(&self, error: &ProcessedError) -> RecoveryResult {
        use FallbackOption::*;

        log_info!(
            error_id = %error.id,
            error_type = %error.error_type,
            severity = %error.severity,
            "Applying fallback recovery"
        );

        let mut data = match error.severity {
            ErrorSeverity::Critical => {
                let copy = "Ocorreu um erro crítico no sistema. Nossa equipe foi notificada.";
                let mut data =
                    RecoveryData::with_action(UiAction::ShowCriticalErrorPage).user_message(copy);
                data.fallback_options = vec![RefreshPage, ContactSupport, TrySafeMode];
                data.requires_support = true;
                data
            }
            ErrorSeverity::High => {
                let mut data = RecoveryData::with_action(UiAction::ShowErrorWithOptions)
                    .user_message("Ocorreu um erro no sistema. Tente uma das opções abaixo.");
                data.fallback_options = vec![RetryOperation, RefreshPage, GoBack, ContactSupport];
                data
            }
            ErrorSeverity::Medium => {
                let mut data = RecoveryData::with_action(UiAction::ShowRecoverableError)
                    .user_message("Não foi possível completar a operação. Tente novamente.");
                data.fallback_options = vec![RetryOperation, TryAlternativeMethod, GoBack];
                data.recoverable = true;
                data.dismissible = true;
                data
            }
            ErrorSeverity::Low => {
                let mut data = RecoveryData::with_action(UiAction::ShowGentleNotification)
                    .user_message("Algo não funcionou como esperado, mas você pode continuar.");
                data.fallback_options = vec![ContinueAnyway, RetryOperation];
                data.recoverable = true;
                data.dismissible = true;
                data
            }
        };
        data.severity = Some(error.severity);

        match error.severity {
            ErrorSeverity::Critical => RecoveryResult::terminal("Critical error fallback", data),
            ErrorSeverity::High => RecoveryResult::terminal("High severity error fallback", data),
            ErrorSeverity::Medium => RecoveryResult::handled("Recoverable error fallback", data),
            ErrorSeverity::Low => RecoveryResult::handled("Low severity error fallback", data),
        }
    }
}
