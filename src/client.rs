//! The seam between the provider and the FeatBit server client.
//!
//! The provider never evaluates flags itself. It talks to an [`FbClient`], which owns flag data
//! synchronization, rule evaluation and the connection lifecycle, and reports its progress
//! through [`StateListener`]s and [`FlagChangeListener`]s.
use std::collections::HashMap;

use serde::Serialize;

/// Evaluation reasons reported by the FeatBit client.
pub mod reason {
    /// The subject has no key.
    pub const USER_NOT_SPECIFIED: &str = "user not specified";
    /// The flag is turned off and serves its disabled variation.
    pub const FLAG_OFF: &str = "flag off";
    /// A prerequisite flag did not serve the expected variation.
    pub const PREREQUISITE_FAILED: &str = "prerequisite failed";
    /// The user is individually targeted.
    pub const TARGET_MATCH: &str = "target match";
    /// The user matched a targeting rule.
    pub const RULE_MATCH: &str = "match rule";
    /// No rule matched; the fallthrough variation was served.
    pub const FALLTHROUGH: &str = "fall through all rules";
    /// The client has not received flag data yet.
    pub const CLIENT_NOT_READY: &str = "client not ready";
    /// The flag does not exist.
    pub const FLAG_NOT_FOUND: &str = "flag not found";
    /// The flag value does not have the requested type.
    pub const WRONG_TYPE: &str = "wrong type";
    /// Any other evaluation failure.
    pub const ERROR: &str = "error in evaluation";
}

/// Built-in user attributes that are not stored as custom attributes.
const BUILT_IN_ATTRIBUTES: [&str; 2] = ["keyid", "name"];

/// A FeatBit user: the subject flags are evaluated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FbUser {
    key: String,
    user_name: String,
    custom: HashMap<String, String>,
}

impl FbUser {
    /// Start building a user identified by `key`. The user name defaults to the key.
    pub fn builder(key: impl Into<String>) -> FbUserBuilder {
        let key = key.into();
        FbUserBuilder {
            user_name: key.clone(),
            key,
            custom: HashMap::new(),
        }
    }

    /// Unique key of the user.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display name of the user.
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Custom attributes used by targeting rules.
    pub fn custom(&self) -> &HashMap<String, String> {
        &self.custom
    }

    /// Value of the custom attribute `name`, if any.
    pub fn custom_attribute(&self, name: &str) -> Option<&str> {
        self.custom.get(name).map(String::as_str)
    }
}

/// Builder for [`FbUser`].
#[derive(Debug, Clone)]
pub struct FbUserBuilder {
    key: String,
    user_name: String,
    custom: HashMap<String, String>,
}

impl FbUserBuilder {
    /// Set the display name.
    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self
    }

    /// Add a custom attribute.
    ///
    /// Blank names and the built-in attributes (`keyid`, `name`, in any case) are ignored: they
    /// are carried by the user key and name.
    pub fn custom(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name.trim().is_empty()
            || BUILT_IN_ATTRIBUTES
                .iter()
                .any(|built_in| name.eq_ignore_ascii_case(built_in))
        {
            return self;
        }
        self.custom.insert(name, value.into());
        self
    }

    /// Finish building the user.
    pub fn build(self) -> FbUser {
        FbUser {
            key: self.key,
            user_name: self.user_name,
            custom: self.custom,
        }
    }
}

/// Outcome of a single evaluation performed by the FeatBit client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalDetail<T> {
    /// Served value, or the caller's default when `default_variation` is set.
    pub variation: T,
    /// Identifier of the served variation.
    pub variation_id: Option<String>,
    /// One of the [`reason`] constants.
    pub reason: String,
    /// Whether the caller's default value was returned.
    pub default_variation: bool,
}

impl<T> EvalDetail<T> {
    /// Convert the served value, keeping the rest of the details.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> EvalDetail<U> {
        EvalDetail {
            variation: f(self.variation),
            variation_id: self.variation_id,
            reason: self.reason,
            default_variation: self.default_variation,
        }
    }
}

/// Data synchronization state of the FeatBit client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateType {
    /// The client is starting and has not received flag data yet.
    Initializing,
    /// Synchronization was interrupted; the client serves possibly outdated data.
    Interrupted,
    /// Flag data is up to date.
    Ok,
    /// Synchronization has been turned off.
    Off,
}

/// Details of an error that caused the client to change state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorTrack {
    /// Kind of failure, as reported by the client.
    pub error_type: String,
    /// Human-readable description of the failure.
    pub message: String,
}

/// A state notification pushed by the FeatBit client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUpdateState {
    /// New state of the client.
    pub state_type: StateType,
    /// Cause of the state change, when it was caused by an error.
    pub error_track: Option<ErrorTrack>,
}

impl DataUpdateState {
    /// A state notification without error details.
    pub fn new(state_type: StateType) -> DataUpdateState {
        DataUpdateState {
            state_type,
            error_track: None,
        }
    }

    /// An `Interrupted` state caused by the given error.
    pub fn interrupted(
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> DataUpdateState {
        DataUpdateState {
            state_type: StateType::Interrupted,
            error_track: Some(ErrorTrack {
                error_type: error_type.into(),
                message: message.into(),
            }),
        }
    }
}

/// A flag-change notification pushed by the FeatBit client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagChange {
    /// Key of the changed flag.
    pub key: String,
}

/// Receives data synchronization state notifications.
pub trait StateListener {
    /// Called by the client, possibly from its own thread, each time its state changes.
    fn on_state_change(&self, state: &DataUpdateState);
}

impl<T: Fn(&DataUpdateState)> StateListener for T {
    fn on_state_change(&self, state: &DataUpdateState) {
        self(state);
    }
}

/// Receives flag-change notifications.
pub trait FlagChangeListener {
    /// Called by the client, possibly from its own thread, when a flag's configuration changed.
    fn on_flag_change(&self, change: &FlagChange);
}

impl<T: Fn(&FlagChange)> FlagChangeListener for T {
    fn on_flag_change(&self, change: &FlagChange) {
        self(change);
    }
}

/// The FeatBit server client as seen by the provider.
///
/// Variation calls never fail: problems are reported through [`EvalDetail::reason`] with the
/// default value served.
pub trait FbClient: Send + Sync {
    /// Boolean variation.
    fn bool_variation_detail(&self, flag_key: &str, user: &FbUser, default: bool)
        -> EvalDetail<bool>;

    /// String variation. A `None` default is served back as `None`.
    fn variation_detail(
        &self,
        flag_key: &str,
        user: &FbUser,
        default: Option<&str>,
    ) -> EvalDetail<Option<String>>;

    /// Integer variation.
    fn int_variation_detail(&self, flag_key: &str, user: &FbUser, default: i64) -> EvalDetail<i64>;

    /// Floating-point variation.
    fn double_variation_detail(&self, flag_key: &str, user: &FbUser, default: f64)
        -> EvalDetail<f64>;

    /// JSON variation. The shape of `default` (array or object) is the expected shape of the
    /// flag value.
    fn json_variation_detail(
        &self,
        flag_key: &str,
        user: &FbUser,
        default: serde_json::Value,
    ) -> EvalDetail<serde_json::Value>;

    /// Whether the client has already received flag data.
    fn is_initialized(&self) -> bool;

    /// Register a listener for data synchronization state changes.
    fn add_state_listener(&self, listener: Box<dyn StateListener + Send + Sync>);

    /// Register a listener for flag configuration changes.
    fn add_flag_change_listener(&self, listener: Box<dyn FlagChangeListener + Send + Sync>);

    /// Release the client's resources (connections, threads).
    fn close(&self) -> std::io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::FbUser;

    #[test]
    fn user_name_defaults_to_key() {
        let user = FbUser::builder("u1").build();
        assert_eq!(user.user_name(), "u1");
    }

    #[test]
    fn built_in_attributes_are_not_custom() {
        let user = FbUser::builder("u1")
            .custom("Name", "Alice")
            .custom("KEYID", "u1")
            .custom(" ", "blank")
            .custom("country", "us")
            .build();

        assert_eq!(user.custom().len(), 1);
        assert_eq!(user.custom_attribute("country"), Some("us"));
    }
}
