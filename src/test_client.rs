//! In-memory [`FbClient`] used by the provider tests.
use std::{
    collections::HashMap,
    io,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use crate::client::{
    reason, DataUpdateState, EvalDetail, FbClient, FbUser, FlagChange, FlagChangeListener,
    StateListener, StateType,
};

#[derive(Default)]
pub(crate) struct TestClient {
    flags: HashMap<String, serde_json::Value>,
    targets: HashMap<(String, String), serde_json::Value>,
    initialized: AtomicBool,
    failing_close: bool,
    close_count: AtomicUsize,
    last_user: Mutex<Option<FbUser>>,
    state_listeners: Mutex<Vec<Box<dyn StateListener + Send + Sync>>>,
    flag_listeners: Mutex<Vec<Box<dyn FlagChangeListener + Send + Sync>>>,
}

impl TestClient {
    pub(crate) fn new() -> TestClient {
        TestClient::default()
    }

    /// Serve `value` to every user.
    pub(crate) fn with_flag(mut self, key: &str, value: serde_json::Value) -> TestClient {
        self.flags.insert(key.to_owned(), value);
        self
    }

    /// Serve `value` to the user with key `user_key`.
    pub(crate) fn with_target(
        mut self,
        key: &str,
        user_key: &str,
        value: serde_json::Value,
    ) -> TestClient {
        self.targets
            .insert((key.to_owned(), user_key.to_owned()), value);
        self
    }

    pub(crate) fn initialized(self) -> TestClient {
        self.initialized.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn failing_close(mut self) -> TestClient {
        self.failing_close = true;
        self
    }

    /// Notify the state listeners. An `Ok` state marks the client initialized once the listeners
    /// have run.
    pub(crate) fn push_state(&self, state: DataUpdateState) {
        for listener in self.state_listeners.lock().unwrap().iter() {
            listener.on_state_change(&state);
        }
        if state.state_type == StateType::Ok {
            self.initialized.store(true, Ordering::SeqCst);
        }
    }

    pub(crate) fn push_flag_change(&self, key: &str) {
        let change = FlagChange {
            key: key.to_owned(),
        };
        for listener in self.flag_listeners.lock().unwrap().iter() {
            listener.on_flag_change(&change);
        }
    }

    pub(crate) fn last_user(&self) -> Option<FbUser> {
        self.last_user.lock().unwrap().clone()
    }

    pub(crate) fn state_listener_count(&self) -> usize {
        self.state_listeners.lock().unwrap().len()
    }

    pub(crate) fn flag_listener_count(&self) -> usize {
        self.flag_listeners.lock().unwrap().len()
    }

    pub(crate) fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    fn evaluate<T>(
        &self,
        flag_key: &str,
        user: &FbUser,
        default: T,
        extract: impl FnOnce(&serde_json::Value) -> Option<T>,
    ) -> EvalDetail<T> {
        *self.last_user.lock().unwrap() = Some(user.clone());

        let fallback = |default, reason: &str| EvalDetail {
            variation: default,
            variation_id: None,
            reason: reason.to_owned(),
            default_variation: true,
        };

        if !self.initialized.load(Ordering::SeqCst) {
            return fallback(default, reason::CLIENT_NOT_READY);
        }

        let (raw, reason) = match self
            .targets
            .get(&(flag_key.to_owned(), user.key().to_owned()))
        {
            Some(raw) => (raw, reason::TARGET_MATCH),
            None => match self.flags.get(flag_key) {
                Some(raw) => (raw, reason::FALLTHROUGH),
                None => return fallback(default, reason::FLAG_NOT_FOUND),
            },
        };

        match extract(raw) {
            Some(variation) => EvalDetail {
                variation,
                variation_id: Some(format!("{flag_key}-variation")),
                reason: reason.to_owned(),
                default_variation: false,
            },
            None => fallback(default, reason::WRONG_TYPE),
        }
    }
}

impl FbClient for TestClient {
    fn bool_variation_detail(
        &self,
        flag_key: &str,
        user: &FbUser,
        default: bool,
    ) -> EvalDetail<bool> {
        self.evaluate(flag_key, user, default, serde_json::Value::as_bool)
    }

    fn variation_detail(
        &self,
        flag_key: &str,
        user: &FbUser,
        default: Option<&str>,
    ) -> EvalDetail<Option<String>> {
        self.evaluate(flag_key, user, default.map(str::to_owned), |raw| {
            raw.as_str().map(|s| Some(s.to_owned()))
        })
    }

    fn int_variation_detail(&self, flag_key: &str, user: &FbUser, default: i64) -> EvalDetail<i64> {
        self.evaluate(flag_key, user, default, serde_json::Value::as_i64)
    }

    fn double_variation_detail(
        &self,
        flag_key: &str,
        user: &FbUser,
        default: f64,
    ) -> EvalDetail<f64> {
        self.evaluate(flag_key, user, default, serde_json::Value::as_f64)
    }

    fn json_variation_detail(
        &self,
        flag_key: &str,
        user: &FbUser,
        default: serde_json::Value,
    ) -> EvalDetail<serde_json::Value> {
        let expect_array = default.is_array();
        self.evaluate(flag_key, user, default, |raw| {
            (raw.is_array() == expect_array && (raw.is_array() || raw.is_object()))
                .then(|| raw.clone())
        })
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn add_state_listener(&self, listener: Box<dyn StateListener + Send + Sync>) {
        self.state_listeners.lock().unwrap().push(listener);
    }

    fn add_flag_change_listener(&self, listener: Box<dyn FlagChangeListener + Send + Sync>) {
        self.flag_listeners.lock().unwrap().push(listener);
    }

    fn close(&self) -> io::Result<()> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        if self.failing_close {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection reset"));
        }
        Ok(())
    }
}
