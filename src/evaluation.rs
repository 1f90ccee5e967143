use serde::Serialize;

/// Structured error code attached to an evaluation whose result is not backed by a flag rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    /// The provider (or the client behind it) has not synchronized flag data yet.
    ProviderNotReady,
    /// The flag does not exist.
    FlagNotFound,
    /// The flag value could not be parsed.
    ParseError,
    /// The flag value does not match the requested type.
    TypeMismatch,
    /// The subject has no targeting key.
    TargetingKeyMissing,
    /// The evaluation context is invalid.
    InvalidContext,
    /// Any other failure.
    General,
}

/// Result of a single flag evaluation, as returned to the abstraction-layer caller.
///
/// `error_code` being set does not make the evaluation fail: `value` then holds the default
/// value the client fell back to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEvaluation<T> {
    /// Evaluated value.
    pub value: T,
    /// Identifier of the served variation. Only set when a variation (not the default) was
    /// served.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Why `value` was returned, as reported by FeatBit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set when `value` is a fallback caused by an evaluation failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    /// Description of the failure behind `error_code`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl<T> ProviderEvaluation<T> {
    /// Create an evaluation holding only a value.
    pub fn new(value: T) -> ProviderEvaluation<T> {
        ProviderEvaluation {
            value,
            variant: None,
            reason: None,
            error_code: None,
            error_message: None,
        }
    }

    /// Convert the value, keeping the rest of the details.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ProviderEvaluation<U> {
        ProviderEvaluation {
            value: f(self.value),
            variant: self.variant,
            reason: self.reason,
            error_code: self.error_code,
            error_message: self.error_message,
        }
    }

    /// Whether the evaluation failed and `value` is a fallback.
    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }
}

/// Static description of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderMetadata {
    /// Name of the provider.
    pub name: &'static str,
}
