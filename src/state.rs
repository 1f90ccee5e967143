use std::{
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use serde::Serialize;

use crate::client::StateType;

/// Lifecycle phase of the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderState {
    /// No flag data has been received yet.
    #[default]
    NotReady,
    /// Flag data is up to date.
    Ready,
    /// Synchronization is off; evaluations use the last known data.
    Stale,
    /// Synchronization was interrupted. Recovers to `Ready` on the next successful sync.
    Error,
    /// The provider cannot recover.
    Fatal,
}

/// Readiness of the provider, shared between the client's notification thread(s) and callers.
///
/// Holds the current [`ProviderState`] and wakes threads blocked in [`Readiness::wait_ready`]
/// once the client has synchronized for the first time.
#[derive(Debug, Default)]
pub(crate) struct Readiness {
    inner: Mutex<Inner>,
    ready: Condvar,
}

#[derive(Debug, Default)]
struct Inner {
    state: ProviderState,
    /// Set on the first `Ready` and never cleared, so a waiter that wakes up after a later
    /// transition still sees the first successful sync.
    synced: bool,
}

impl Inner {
    fn become_ready(&mut self) {
        self.state = ProviderState::Ready;
        self.synced = true;
    }
}

impl Readiness {
    pub(crate) fn new() -> Readiness {
        Readiness::default()
    }

    pub(crate) fn get(&self) -> ProviderState {
        self.lock().state
    }

    /// Force the state to `Ready` without reporting a transition.
    pub(crate) fn set_ready(&self) {
        self.lock().become_ready();
        self.ready.notify_all();
    }

    /// Apply a client state notification.
    ///
    /// Returns the new state if the transition must be announced to the caller. `Ok` is
    /// announced only when the provider was not ready already.
    pub(crate) fn apply(&self, state_type: StateType) -> Option<ProviderState> {
        let mut inner = self.lock();
        match state_type {
            StateType::Initializing => {
                inner.state = ProviderState::NotReady;
                None
            }
            StateType::Interrupted => {
                inner.state = ProviderState::Error;
                Some(ProviderState::Error)
            }
            StateType::Ok if inner.state == ProviderState::Ready => None,
            StateType::Ok => {
                inner.become_ready();
                self.ready.notify_all();
                Some(ProviderState::Ready)
            }
            StateType::Off => {
                inner.state = ProviderState::Stale;
                Some(ProviderState::Stale)
            }
        }
    }

    /// Block until the client has synchronized at least once or `timeout` elapses. Returns
    /// whether a synchronization happened.
    pub(crate) fn wait_ready(&self, timeout: Duration) -> bool {
        let (inner, _) = self
            .ready
            .wait_timeout_while(self.lock(), timeout, |inner| !inner.synced)
            .unwrap_or_else(PoisonError::into_inner);
        inner.synced
    }

    // The guarded value is plain data that is always valid, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
