//! Conversion of FeatBit evaluation details into [`ProviderEvaluation`]s.
use crate::{
    client::{reason, EvalDetail},
    ErrorCode, ProviderEvaluation,
};

/// Convert the client's evaluation detail into the caller-facing evaluation.
///
/// The variant is only reported when a variation was actually served. An error code is attached
/// whenever the reason denotes an evaluation failure, whether or not the default value was served.
pub fn to_provider_evaluation<T>(detail: EvalDetail<T>) -> ProviderEvaluation<T> {
    let error_code = error_code(&detail.reason);
    ProviderEvaluation {
        value: detail.variation,
        variant: if detail.default_variation {
            None
        } else {
            detail.variation_id
        },
        error_message: error_code.map(|_| detail.reason.clone()),
        reason: Some(detail.reason),
        error_code,
    }
}

/// Map a FeatBit reason to an error code. Returns `None` for non-error reasons.
pub fn error_code(reason: &str) -> Option<ErrorCode> {
    match reason {
        reason::USER_NOT_SPECIFIED => Some(ErrorCode::TargetingKeyMissing),
        reason::CLIENT_NOT_READY => Some(ErrorCode::ProviderNotReady),
        reason::FLAG_NOT_FOUND => Some(ErrorCode::FlagNotFound),
        reason::WRONG_TYPE => Some(ErrorCode::TypeMismatch),
        reason::ERROR => Some(ErrorCode::General),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::to_provider_evaluation;
    use crate::{
        client::{reason, EvalDetail},
        ErrorCode,
    };

    fn detail(reason: &str, default_variation: bool) -> EvalDetail<bool> {
        EvalDetail {
            variation: true,
            variation_id: Some("variation-1".to_owned()),
            reason: reason.to_owned(),
            default_variation,
        }
    }

    #[test]
    fn successful_reasons_carry_no_error_code() {
        for reason in [
            reason::TARGET_MATCH,
            reason::RULE_MATCH,
            reason::FALLTHROUGH,
            reason::FLAG_OFF,
            reason::PREREQUISITE_FAILED,
            "match segment",
        ] {
            let evaluation = to_provider_evaluation(detail(reason, false));

            assert_eq!(evaluation.error_code, None, "{reason}");
            assert_eq!(evaluation.error_message, None, "{reason}");
            assert_eq!(evaluation.reason.as_deref(), Some(reason));
            assert!(evaluation.value);
        }
    }

    #[test]
    fn error_reasons_map_to_error_codes() {
        for (reason, code) in [
            (reason::USER_NOT_SPECIFIED, ErrorCode::TargetingKeyMissing),
            (reason::CLIENT_NOT_READY, ErrorCode::ProviderNotReady),
            (reason::FLAG_NOT_FOUND, ErrorCode::FlagNotFound),
            (reason::WRONG_TYPE, ErrorCode::TypeMismatch),
            (reason::ERROR, ErrorCode::General),
        ] {
            let evaluation = to_provider_evaluation(detail(reason, true));

            assert_eq!(evaluation.error_code, Some(code), "{reason}");
            assert_eq!(evaluation.error_message.as_deref(), Some(reason));
            assert_eq!(evaluation.reason.as_deref(), Some(reason));
        }
    }

    #[test]
    fn error_code_does_not_depend_on_default_variation() {
        let evaluation = to_provider_evaluation(detail(reason::FLAG_NOT_FOUND, false));
        assert_eq!(evaluation.error_code, Some(ErrorCode::FlagNotFound));
    }

    #[test]
    fn variant_is_only_reported_for_served_variations() {
        let served = to_provider_evaluation(detail(reason::RULE_MATCH, false));
        assert_eq!(served.variant.as_deref(), Some("variation-1"));

        let fallback = to_provider_evaluation(detail(reason::FLAG_NOT_FOUND, true));
        assert_eq!(fallback.variant, None);
    }
}
