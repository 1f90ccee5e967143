use std::time::Duration;

use crate::{client::FbClient, events::EventHandler, FbProvider};

/// Configuration for [`FbProvider`].
///
/// # Examples
/// ```
/// # use std::time::Duration;
/// # use featbit_openfeature::{ProviderConfig, ProviderEvent};
/// let mut config = ProviderConfig::new();
/// config
///     .init_timeout(Duration::from_secs(30))
///     .event_handler(|event: ProviderEvent| {
///         println!("{:?}", event);
///     });
/// ```
pub struct ProviderConfig {
    pub(crate) init_timeout: Duration,
    pub(crate) event_handlers: Vec<Box<dyn EventHandler + Send + Sync>>,
}

impl ProviderConfig {
    /// Default value for [`ProviderConfig::init_timeout`].
    pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(3 * 60);

    /// Create a default provider configuration.
    pub fn new() -> Self {
        ProviderConfig {
            init_timeout: ProviderConfig::DEFAULT_INIT_TIMEOUT,
            event_handlers: Vec::new(),
        }
    }

    /// Maximum time [`FbProvider::initialize`] waits for the FeatBit client to become ready.
    ///
    /// Defaults to [`ProviderConfig::DEFAULT_INIT_TIMEOUT`].
    pub fn init_timeout(&mut self, init_timeout: Duration) -> &mut Self {
        self.init_timeout = init_timeout;
        self
    }

    /// Register a handler for provider events. Can be called multiple times.
    pub fn event_handler(
        &mut self,
        handler: impl EventHandler + Send + Sync + 'static,
    ) -> &mut Self {
        self.event_handlers.push(Box::new(handler));
        self
    }

    /// Create a new [`FbProvider`] wrapping `client` using this configuration.
    pub fn to_provider<C: FbClient>(self, client: C) -> FbProvider<C> {
        FbProvider::new(client, self)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::new()
    }
}
