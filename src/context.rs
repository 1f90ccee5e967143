use std::collections::HashMap;

use serde::Serialize;

use crate::Value;

/// Caller-supplied attributes describing the subject a flag is evaluated for.
///
/// The targeting key identifies the subject. When it is absent or blank, the `key` and `keyid`
/// attributes are used instead (see [`to_fb_user`](crate::context_converter::to_fb_user)).
///
/// ```
/// # use featbit_openfeature::EvaluationContext;
/// let context = EvaluationContext::new("user-1")
///     .with_attribute("name", "Alice")
///     .with_attribute("country", "us");
/// assert_eq!(context.targeting_key(), Some("user-1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationContext {
    targeting_key: Option<String>,
    attributes: HashMap<String, Value>,
}

impl EvaluationContext {
    /// Create a context with the given targeting key and no attributes.
    pub fn new(targeting_key: impl Into<String>) -> EvaluationContext {
        EvaluationContext {
            targeting_key: Some(targeting_key.into()),
            attributes: HashMap::new(),
        }
    }

    /// Replace the targeting key.
    pub fn with_targeting_key(mut self, targeting_key: impl Into<String>) -> EvaluationContext {
        self.targeting_key = Some(targeting_key.into());
        self
    }

    /// Add (or replace) an attribute.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> EvaluationContext {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Explicit targeting key, if one was set.
    pub fn targeting_key(&self) -> Option<&str> {
        self.targeting_key.as_deref()
    }

    /// Value of the attribute `name`, if any.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// All attributes.
    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for EvaluationContext {
    /// Build a context without an explicit targeting key.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        EvaluationContext {
            targeting_key: None,
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
