use std::{sync::Arc, time::Duration};

use thiserror::Error;

/// Result type used by the provider's own operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the provider itself.
///
/// Failures reported by the FeatBit client during evaluation (unknown flag, wrong type, client not
/// ready, ...) are not errors: they are returned as an [`ErrorCode`](crate::ErrorCode) inside a
/// successful [`ProviderEvaluation`](crate::ProviderEvaluation).
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// The evaluation context has no usable targeting key (explicit key, `key` or `keyid`).
    #[error("the evaluation context did not contain a valid targeting key")]
    InvalidContext,

    /// The default value passed to an object evaluation has a shape that cannot be mapped to a
    /// FeatBit variation call.
    #[error("unsupported default value type: {0}")]
    UnsupportedDefaultType(&'static str),

    /// The FeatBit client did not become ready in time.
    #[error("failed to initialize FeatBit client within {0:?}")]
    InitializationTimeout(Duration),

    /// The FeatBit client failed to release its resources.
    #[error("failed to close FeatBit client")]
    // std::io::Error is not clonable, so we're wrapping it in an Arc.
    ShutdownFailure(#[source] Arc<std::io::Error>),
}

