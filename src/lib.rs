//! An OpenFeature-style provider for FeatBit, an open-source feature flag management platform.
//!
//! # Overview
//!
//! The crate revolves around an [`FbProvider`] that wraps a FeatBit server client (anything
//! implementing [`client::FbClient`]) and resolves feature flags for an [`EvaluationContext`]. The
//! context is converted into a FeatBit user, the flag is evaluated by the client and the result is
//! returned as a [`ProviderEvaluation`] carrying the value, variant, reason and an optional
//! [`ErrorCode`].
//!
//! The conversions are available on their own in [`context_converter`], [`value_converter`] and
//! [`detail_converter`].
//!
//! # Readiness
//!
//! [`FbProvider::initialize`] blocks until the FeatBit client has synchronized flag data, up to
//! [`ProviderConfig::init_timeout`]. The current [`ProviderState`] follows the client's data
//! synchronization state afterwards.
//!
//! # Events
//!
//! Register an [`EventHandler`] with [`ProviderConfig::event_handler`] or
//! [`FbProvider::add_event_handler`] to be notified when the provider becomes ready, loses
//! synchronization, goes stale or when a flag configuration changes.
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum.
//!
//! Evaluation failures reported by the FeatBit client (unknown flag, type mismatch, client not
//! ready) are not errors: the default value is returned together with an [`ErrorCode`]. Only
//! problems with the caller's input (a context without a targeting key, an unsupported default
//! value type) are returned as errors.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging
//! messages under the `featbit` target. Consider integrating a `log`-compatible logger
//! implementation for better visibility into provider operations.
//!
//! # Examples
//!
//! A runnable example lives in the `demos/simple` directory of the crate repository.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

pub mod client;
pub mod context_converter;
pub mod detail_converter;
pub mod value_converter;

mod config;
mod context;
mod error;
mod evaluation;
mod events;
mod provider;
mod state;
mod value;

#[cfg(test)]
mod test_client;

pub use config::ProviderConfig;
pub use context::EvaluationContext;
pub use error::{Error, Result};
pub use evaluation::{ErrorCode, ProviderEvaluation, ProviderMetadata};
pub use events::{EventDetails, EventHandler, ProviderEvent};
pub use provider::FbProvider;
pub use state::ProviderState;
pub use value::{Structure, Value};
