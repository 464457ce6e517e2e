//! # Payload Capability
//!
//! What a publisher needs from a payload beyond serialization: a logical
//! type name for the type tag, and a field lookup for header extraction.

use super::message::PropertyValue;
use serde::Serialize;
use std::borrow::Cow;

/// A value that can be published.
///
/// Only `Serialize` is required; both methods have defaults. The default
/// `field` looks the key up in the payload's serialized form, so a plain
/// `impl Payload for Order {}` already exposes its top-level fields.
/// Override it to skip that extra serialization:
///
/// ```rust
/// use serde::Serialize;
/// use topic_publisher::{Payload, PropertyValue};
///
/// #[derive(Serialize)]
/// struct Order {
///     customer_id: String,
///     amount: u64,
/// }
///
/// impl Payload for Order {
///     fn field(&self, key: &str) -> Option<PropertyValue> {
///         match key {
///             "customer_id" => Some(self.customer_id.clone().into()),
///             "amount" => Some(self.amount.into()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Payload: Serialize {
    /// Logical type name, written to the `type` property.
    ///
    /// Defaults to the unqualified Rust type name.
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name(std::any::type_name::<Self>()))
    }

    /// Value of the top-level field named `key` as serialized, or `None`
    /// when absent or null.
    fn field(&self, key: &str) -> Option<PropertyValue> {
        serde_json::to_value(self)
            .ok()
            .and_then(|value| value.get(key).and_then(PropertyValue::from_json))
    }
}

impl<T: Payload + ?Sized> Payload for &T {
    fn type_name(&self) -> Cow<'_, str> {
        (**self).type_name()
    }

    fn field(&self, key: &str) -> Option<PropertyValue> {
        (**self).field(key)
    }
}

impl<T: Payload + ?Sized> Payload for Box<T> {
    fn type_name(&self) -> Cow<'_, str> {
        (**self).type_name()
    }

    fn field(&self, key: &str) -> Option<PropertyValue> {
        (**self).field(key)
    }
}

/// Untyped JSON payloads expose their top-level object keys.
impl Payload for serde_json::Value {
    fn field(&self, key: &str) -> Option<PropertyValue> {
        self.get(key).and_then(PropertyValue::from_json)
    }
}

/// Strip module path and generic arguments: `a::b::Order<x::Y>` → `Order`.
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
