//! Conversion of an [`EvaluationContext`] into the [`FbUser`] the FeatBit client evaluates.
use crate::{client::FbUser, EvaluationContext, Error, Result, Value};

/// Attribute used as the targeting key when the context has none.
const KEY_ATTRIBUTE: &str = "key";
/// Attribute used as the targeting key when neither the targeting key nor `key` is usable.
const KEY_ID_ATTRIBUTE: &str = "keyid";
const NAME_ATTRIBUTE: &str = "name";
const USERNAME_ATTRIBUTE: &str = "username";

/// Build the FeatBit user for `context`.
///
/// The user key is the first non-blank of: the targeting key, the `key` attribute, the `keyid`
/// attribute. The user name is the first non-blank of: the `name` attribute, the `username`
/// attribute, the user key.
///
/// String attributes are forwarded as custom attributes. Attributes of any other type are not
/// forwarded to FeatBit.
///
/// # Errors
///
/// Returns [`Error::InvalidContext`] if no targeting key can be resolved.
///
/// ```
/// # use featbit_openfeature::{context_converter::to_fb_user, EvaluationContext};
/// let context = EvaluationContext::default().with_attribute("key", "user-2");
/// assert_eq!(to_fb_user(&context).unwrap().key(), "user-2");
/// ```
pub fn to_fb_user(context: &EvaluationContext) -> Result<FbUser> {
    let key = context
        .targeting_key()
        .filter(|key| is_not_blank(key))
        .or_else(|| string_attribute(context, KEY_ATTRIBUTE))
        .or_else(|| string_attribute(context, KEY_ID_ATTRIBUTE))
        .ok_or(Error::InvalidContext)?;

    let mut builder = FbUser::builder(key);
    if let Some(name) = string_attribute(context, NAME_ATTRIBUTE)
        .or_else(|| string_attribute(context, USERNAME_ATTRIBUTE))
    {
        builder = builder.user_name(name);
    }

    for (name, value) in context.attributes() {
        if let Value::String(value) = value {
            builder = builder.custom(name.as_str(), value.as_str());
        }
    }

    Ok(builder.build())
}

/// Returns the attribute `name` if it is a non-blank string.
fn string_attribute<'a>(context: &'a EvaluationContext, name: &str) -> Option<&'a str> {
    context
        .attribute(name)
        .and_then(Value::as_str)
        .filter(|value| is_not_blank(value))
}

fn is_not_blank(s: &str) -> bool {
    !s.trim().is_empty()
}
