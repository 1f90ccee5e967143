use std::{
    collections::HashMap,
    io,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use featbit_openfeature::{
    client::{
        reason, DataUpdateState, EvalDetail, FbClient, FbUser, FlagChangeListener, StateListener,
        StateType,
    },
    EvaluationContext, ProviderConfig, ProviderEvent, Structure,
};
use serde_json::json;

/// A client serving a fixed set of flags. It reports itself ready shortly after start-up, the
/// way a real FeatBit client does once its first data synchronization completes.
struct StaticClient {
    flags: HashMap<&'static str, serde_json::Value>,
    ready: Arc<Mutex<bool>>,
    listeners: Arc<Mutex<Vec<Box<dyn StateListener + Send + Sync>>>>,
}

impl StaticClient {
    fn start(flags: HashMap<&'static str, serde_json::Value>) -> StaticClient {
        let client = StaticClient {
            flags,
            ready: Arc::default(),
            listeners: Arc::default(),
        };

        let ready = client.ready.clone();
        let listeners = client.listeners.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            *ready.lock().unwrap() = true;
            let state = DataUpdateState::new(StateType::Ok);
            for listener in listeners.lock().unwrap().iter() {
                listener.on_state_change(&state);
            }
        });

        client
    }

    fn serve<T>(
        &self,
        flag_key: &str,
        default: T,
        extract: impl FnOnce(&serde_json::Value) -> Option<T>,
    ) -> EvalDetail<T> {
        let fallback = |default, reason: &str| EvalDetail {
            variation: default,
            variation_id: None,
            reason: reason.to_owned(),
            default_variation: true,
        };

        if !*self.ready.lock().unwrap() {
            return fallback(default, reason::CLIENT_NOT_READY);
        }
        let Some(raw) = self.flags.get(flag_key) else {
            return fallback(default, reason::FLAG_NOT_FOUND);
        };
        match extract(raw) {
            Some(variation) => EvalDetail {
                variation,
                variation_id: Some(format!("{flag_key}-on")),
                reason: reason::FALLTHROUGH.to_owned(),
                default_variation: false,
            },
            None => fallback(default, reason::WRONG_TYPE),
        }
    }
}

impl FbClient for StaticClient {
    fn bool_variation_detail(
        &self,
        flag_key: &str,
        _: &FbUser,
        default: bool,
    ) -> EvalDetail<bool> {
        self.serve(flag_key, default, serde_json::Value::as_bool)
    }

    fn variation_detail(
        &self,
        flag_key: &str,
        _: &FbUser,
        default: Option<&str>,
    ) -> EvalDetail<Option<String>> {
        self.serve(flag_key, default.map(str::to_owned), |raw| {
            raw.as_str().map(|s| Some(s.to_owned()))
        })
    }

    fn int_variation_detail(&self, flag_key: &str, _: &FbUser, default: i64) -> EvalDetail<i64> {
        self.serve(flag_key, default, serde_json::Value::as_i64)
    }

    fn double_variation_detail(
        &self,
        flag_key: &str,
        _: &FbUser,
        default: f64,
    ) -> EvalDetail<f64> {
        self.serve(flag_key, default, serde_json::Value::as_f64)
    }

    fn json_variation_detail(
        &self,
        flag_key: &str,
        _: &FbUser,
        default: serde_json::Value,
    ) -> EvalDetail<serde_json::Value> {
        // The flag value must have the shape of the default: an array or an object.
        let expect_array = default.is_array();
        self.serve(flag_key, default, |raw| {
            (raw.is_array() == expect_array && (raw.is_array() || raw.is_object()))
                .then(|| raw.clone())
        })
    }

    fn is_initialized(&self) -> bool {
        *self.ready.lock().unwrap()
    }

    fn add_state_listener(&self, listener: Box<dyn StateListener + Send + Sync>) {
        self.listeners.lock().unwrap().push(listener);
    }

    fn add_flag_change_listener(&self, _: Box<dyn FlagChangeListener + Send + Sync>) {}

    fn close(&self) -> io::Result<()> {
        Ok(())
    }
}

pub fn main() -> featbit_openfeature::Result<()> {
    env_logger::init();

    let client = StaticClient::start(HashMap::from([
        ("new-checkout", json!(true)),
        ("banner", json!({"title": "Autumn sale", "discount": 15})),
    ]));

    let mut config = ProviderConfig::new();
    config
        .init_timeout(Duration::from_secs(5))
        .event_handler(|event: ProviderEvent| println!("Event: {:?}", event));
    let provider = config.to_provider(client);

    // Block until the client has flag data.
    provider.initialize()?;

    let context = EvaluationContext::new("test-subject").with_attribute("country", "us");

    let checkout = provider.get_boolean_evaluation("new-checkout", false, &context)?;
    println!("new-checkout: {:?}", checkout);

    let banner = provider.get_object_evaluation("banner", Structure::new().into(), &context)?;
    println!("banner: {:?}", banner);

    let missing = provider.get_string_evaluation("missing-flag", "fallback", &context)?;
    println!("missing-flag: {:?}", missing);

    provider.shutdown()
}
