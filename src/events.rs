use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

/// Details attached to a [`ProviderEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    /// Human-readable description of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Keys of the flags whose configuration changed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags_changed: Vec<String>,
}

impl EventDetails {
    /// Details carrying only a message.
    pub fn with_message(message: impl Into<String>) -> EventDetails {
        EventDetails {
            message: Some(message.into()),
            flags_changed: Vec::new(),
        }
    }

    /// Details listing the changed flags.
    pub fn with_flags_changed(flags_changed: Vec<String>) -> EventDetails {
        EventDetails {
            message: None,
            flags_changed,
        }
    }
}

/// An event emitted by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "details", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderEvent {
    /// The provider became ready.
    ProviderReady(EventDetails),
    /// The provider lost synchronization.
    ProviderError(EventDetails),
    /// Synchronization was turned off; flag data may be outdated.
    ProviderStale(EventDetails),
    /// A flag configuration changed.
    ProviderConfigurationChanged(EventDetails),
}

impl ProviderEvent {
    /// Details attached to the event, whatever its type.
    pub fn details(&self) -> &EventDetails {
        match self {
            ProviderEvent::ProviderReady(details)
            | ProviderEvent::ProviderError(details)
            | ProviderEvent::ProviderStale(details)
            | ProviderEvent::ProviderConfigurationChanged(details) => details,
        }
    }
}

/// A trait for receiving provider events.
///
/// Implemented for closures:
///
/// ```
/// # use featbit_openfeature::{ProviderConfig, ProviderEvent};
/// let mut config = ProviderConfig::new();
/// config.event_handler(|event: ProviderEvent| {
///     println!("{:?}", event);
/// });
/// ```
pub trait EventHandler {
    /// Handle a provider event.
    ///
    /// # Notes
    ///
    /// Events are delivered synchronously from the FeatBit client's notification thread, in the
    /// order the client reported them. Handlers should not block.
    fn on_event(&self, event: ProviderEvent);
}

impl<T: Fn(ProviderEvent)> EventHandler for T {
    fn on_event(&self, event: ProviderEvent) {
        self(event);
    }
}

/// Fans events out to the registered handlers.
///
/// Handlers run without the registry lock held, so a handler may register further handlers.
#[derive(Default)]
pub(crate) struct EventEmitter {
    handlers: RwLock<Vec<Arc<dyn EventHandler + Send + Sync>>>,
}

impl EventEmitter {
    pub(crate) fn new(handlers: Vec<Box<dyn EventHandler + Send + Sync>>) -> EventEmitter {
        EventEmitter {
            handlers: RwLock::new(handlers.into_iter().map(Arc::from).collect()),
        }
    }

    pub(crate) fn add_handler(&self, handler: Box<dyn EventHandler + Send + Sync>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::from(handler));
    }

    pub(crate) fn emit(&self, event: ProviderEvent) {
        log::debug!(target: "featbit", event:serde; "emitting provider event");
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for handler in handlers {
            handler.on_event(event.clone());
        }
    }
}
