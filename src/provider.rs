use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Once,
    },
    time::Duration,
};

#[cfg(doc)]
use crate::ErrorCode;
use crate::{
    client::{DataUpdateState, EvalDetail, FbClient, FbUser, FlagChange},
    context_converter::to_fb_user,
    detail_converter::to_provider_evaluation,
    events::{EventEmitter, EventHandler},
    state::Readiness,
    value_converter::to_value,
    Error, EvaluationContext, EventDetails, ProviderConfig, ProviderEvaluation, ProviderEvent,
    ProviderMetadata, ProviderState, Result, Value,
};

const METADATA: ProviderMetadata = ProviderMetadata {
    name: "FeatBit.OpenFeature.RustServerProvider",
};

const READY_MESSAGE: &str = "FeatBit provider is ready";
const STALE_MESSAGE: &str = "FeatBit provider is OFF";
const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// A feature-flag provider backed by the FeatBit server client.
///
/// The provider resolves flags through an [`FbClient`]: it converts the caller's
/// [`EvaluationContext`] into a FeatBit user, delegates evaluation and converts the result back
/// into a [`ProviderEvaluation`].
///
/// # Readiness
///
/// Call [`FbProvider::initialize`] once before evaluating flags. It subscribes to the client's
/// notifications and blocks until the client has synchronized flag data. From then on
/// [`FbProvider::state`] follows the client and registered [`EventHandler`]s receive a
/// [`ProviderEvent`] on each announced transition.
///
/// # Examples
/// ```
/// # use featbit_openfeature::{client::FbClient, EvaluationContext, FbProvider};
/// # fn test<C: FbClient>(client: C) -> featbit_openfeature::Result<()> {
/// let provider = FbProvider::with_defaults(client);
/// provider.initialize()?;
///
/// let context = EvaluationContext::new("user-1").with_attribute("country", "us");
/// let enabled = provider
///     .get_boolean_evaluation("new-checkout", false, &context)
///     .map(|evaluation| evaluation.value)
///     .unwrap_or(false);
///
/// provider.shutdown()?;
/// # Ok(())
/// # }
/// ```
pub struct FbProvider<C> {
    client: C,
    shared: Arc<Shared>,
    init_timeout: Duration,
    subscribed: Once,
    closed: AtomicBool,
}

/// State reachable from the client's notification threads.
struct Shared {
    readiness: Readiness,
    events: EventEmitter,
}

impl<C: FbClient> FbProvider<C> {
    /// Create a provider wrapping `client`.
    pub fn new(client: C, config: ProviderConfig) -> FbProvider<C> {
        FbProvider {
            client,
            shared: Arc::new(Shared {
                readiness: Readiness::new(),
                events: EventEmitter::new(config.event_handlers),
            }),
            init_timeout: config.init_timeout,
            subscribed: Once::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Create a provider wrapping `client` with the default configuration.
    pub fn with_defaults(client: C) -> FbProvider<C> {
        FbProvider::new(client, ProviderConfig::default())
    }

    /// Static description of this provider.
    pub fn metadata(&self) -> ProviderMetadata {
        METADATA
    }

    /// Current readiness state.
    pub fn state(&self) -> ProviderState {
        self.shared.readiness.get()
    }

    /// The wrapped FeatBit client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Register a handler for provider events.
    pub fn add_event_handler(&self, handler: impl EventHandler + Send + Sync + 'static) {
        self.shared.events.add_handler(Box::new(handler));
    }

    /// Subscribe to the client's notifications and wait for the client to become ready.
    ///
    /// Returns immediately if the client is already initialized. Otherwise blocks until the
    /// client reports a successful synchronization or the configured
    /// [`init_timeout`](ProviderConfig::init_timeout) elapses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitializationTimeout`] if the client did not become ready in time. The
    /// provider should then be considered unusable.
    pub fn initialize(&self) -> Result<()> {
        self.subscribe();

        if self.client.is_initialized() {
            log::debug!(target: "featbit", "FeatBit client already initialized");
            self.shared.readiness.set_ready();
            return Ok(());
        }

        let timeout_ms = self.init_timeout.as_millis() as u64;
        log::debug!(target: "featbit", timeout_ms; "waiting for FeatBit client to become ready");
        if !self.shared.readiness.wait_ready(self.init_timeout) {
            log::warn!(target: "featbit", timeout_ms; "FeatBit client did not become ready in time");
            return Err(Error::InitializationTimeout(self.init_timeout));
        }

        Ok(())
    }

    /// Close the FeatBit client.
    ///
    /// Only the first call closes the client; later calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShutdownFailure`] if the client failed to close.
    pub fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            log::debug!(target: "featbit", "provider already shut down");
            return Ok(());
        }

        log::debug!(target: "featbit", "closing FeatBit client");
        self.client.close().map_err(|err| {
            log::warn!(target: "featbit", "failed to close FeatBit client: {:?}", err);
            Error::ShutdownFailure(Arc::new(err))
        })
    }

    /// Evaluate a boolean flag.
    ///
    /// Failures reported by the client (unknown flag, wrong type, ...) are not errors: the
    /// returned evaluation holds `default_value` and an [`ErrorCode`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContext`] if no targeting key can be resolved from `context`.
    pub fn get_boolean_evaluation(
        &self,
        flag_key: &str,
        default_value: bool,
        context: &EvaluationContext,
    ) -> Result<ProviderEvaluation<bool>> {
        let user = self.user(flag_key, context)?;
        let detail = self
            .client
            .bool_variation_detail(flag_key, &user, default_value);
        Ok(evaluated(flag_key, &user, detail))
    }

    /// Evaluate a string flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContext`] if no targeting key can be resolved from `context`.
    pub fn get_string_evaluation(
        &self,
        flag_key: &str,
        default_value: &str,
        context: &EvaluationContext,
    ) -> Result<ProviderEvaluation<String>> {
        let user = self.user(flag_key, context)?;
        let detail = self
            .client
            .variation_detail(flag_key, &user, Some(default_value))
            .map(|value| value.unwrap_or_else(|| default_value.to_owned()));
        Ok(evaluated(flag_key, &user, detail))
    }

    /// Evaluate an integer flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContext`] if no targeting key can be resolved from `context`.
    pub fn get_integer_evaluation(
        &self,
        flag_key: &str,
        default_value: i64,
        context: &EvaluationContext,
    ) -> Result<ProviderEvaluation<i64>> {
        let user = self.user(flag_key, context)?;
        let detail = self
            .client
            .int_variation_detail(flag_key, &user, default_value);
        Ok(evaluated(flag_key, &user, detail))
    }

    /// Evaluate a floating-point flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContext`] if no targeting key can be resolved from `context`.
    pub fn get_double_evaluation(
        &self,
        flag_key: &str,
        default_value: f64,
        context: &EvaluationContext,
    ) -> Result<ProviderEvaluation<f64>> {
        let user = self.user(flag_key, context)?;
        let detail = self
            .client
            .double_variation_detail(flag_key, &user, default_value);
        Ok(evaluated(flag_key, &user, detail))
    }

    /// Evaluate a flag of any type.
    ///
    /// The kind of `default_value` selects the client call:
    /// - null or string: string variation (a null default is served back as [`Value::Null`]);
    /// - boolean, double, integer: the matching typed variation;
    /// - list or structure: JSON variation, with the result converted into a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns the following errors:
    /// - [`Error::UnsupportedDefaultType`] if `default_value` is a timestamp;
    /// - [`Error::InvalidContext`] if no targeting key can be resolved from `context`.
    pub fn get_object_evaluation(
        &self,
        flag_key: &str,
        default_value: Value,
        context: &EvaluationContext,
    ) -> Result<ProviderEvaluation<Value>> {
        let user = || self.user(flag_key, context);

        let evaluation = match &default_value {
            Value::Null | Value::String(_) => {
                let user = user()?;
                let detail = self
                    .client
                    .variation_detail(flag_key, &user, default_value.as_str());
                evaluated(flag_key, &user, detail)
                    .map(|value| value.map_or(Value::Null, Value::String))
            }
            Value::Bool(default) => {
                let user = user()?;
                let detail = self.client.bool_variation_detail(flag_key, &user, *default);
                evaluated(flag_key, &user, detail).map(Value::Bool)
            }
            Value::Float(default) => {
                let user = user()?;
                let detail = self
                    .client
                    .double_variation_detail(flag_key, &user, *default);
                evaluated(flag_key, &user, detail).map(Value::Float)
            }
            Value::Int(default) => {
                let user = user()?;
                let detail = self.client.int_variation_detail(flag_key, &user, *default);
                evaluated(flag_key, &user, detail).map(Value::Int)
            }
            Value::List(_) | Value::Structure(_) => {
                let user = user()?;
                let detail = self.client.json_variation_detail(
                    flag_key,
                    &user,
                    serde_json::Value::from(&default_value),
                );
                evaluated(flag_key, &user, detail).map(|raw| to_value(&raw))
            }
            Value::Timestamp(_) => {
                log::warn!(target: "featbit",
                           flag_key,
                           default_type = default_value.kind();
                           "unsupported default value type");
                return Err(Error::UnsupportedDefaultType(default_value.kind()));
            }
        };

        Ok(evaluation)
    }

    fn user(&self, flag_key: &str, context: &EvaluationContext) -> Result<FbUser> {
        to_fb_user(context).inspect_err(|err| {
            log::warn!(target: "featbit", flag_key; "cannot evaluate a flag: {}", err);
        })
    }

    fn subscribe(&self) {
        self.subscribed.call_once(|| {
            let shared = Arc::clone(&self.shared);
            self.client
                .add_state_listener(Box::new(move |state: &DataUpdateState| {
                    shared.on_state_change(state)
                }));

            let shared = Arc::clone(&self.shared);
            self.client
                .add_flag_change_listener(Box::new(move |change: &FlagChange| {
                    shared.on_flag_change(change)
                }));

            log::debug!(target: "featbit", "subscribed to FeatBit client notifications");
        });
    }
}

impl Shared {
    fn on_state_change(&self, state: &DataUpdateState) {
        log::debug!(target: "featbit", state:serde; "FeatBit client state changed");

        let Some(announced) = self.readiness.apply(state.state_type) else {
            return;
        };

        let event = match announced {
            ProviderState::Ready => {
                ProviderEvent::ProviderReady(EventDetails::with_message(READY_MESSAGE))
            }
            ProviderState::Stale => {
                ProviderEvent::ProviderStale(EventDetails::with_message(STALE_MESSAGE))
            }
            ProviderState::Error => {
                let message = state
                    .error_track
                    .as_ref()
                    .map_or(UNKNOWN_ERROR_MESSAGE, |track| track.message.as_str());
                log::warn!(target: "featbit",
                           "FeatBit client synchronization interrupted: {}", message);
                ProviderEvent::ProviderError(EventDetails::with_message(message))
            }
            ProviderState::NotReady | ProviderState::Fatal => return,
        };

        self.events.emit(event);
    }

    fn on_flag_change(&self, change: &FlagChange) {
        self.events.emit(ProviderEvent::ProviderConfigurationChanged(
            EventDetails::with_flags_changed(vec![change.key.clone()]),
        ));
    }
}

fn evaluated<T>(flag_key: &str, user: &FbUser, detail: EvalDetail<T>) -> ProviderEvaluation<T> {
    log::trace!(target: "featbit",
                flag_key,
                user:serde,
                reason = detail.reason.as_str(),
                default_variation = detail.default_variation;
                "evaluated a flag");
    to_provider_evaluation(detail)
}
