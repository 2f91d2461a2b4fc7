//! Lenient JSON request bodies.
//!
//! The driver app and the dashboard post small JSON objects, sometimes with
//! numbers sent as strings or fields missing. A body that is not a JSON
//! object is read as `{}` rather than rejected.

use serde_json::{Map, Value};
use tracing::trace;

use crate::alert::coordinate_from_value;

/// A request body read as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Parse a request body, falling back to an empty object.
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self(map),
            Ok(other) => {
                trace!("Ignoring non-object body: {}", other);
                Self::default()
            }
            Err(err) => {
                if !body.is_empty() {
                    trace!("Ignoring unparseable body: {}", err);
                }
                Self::default()
            }
        }
    }

    /// The raw value of a field, `null` when absent.
    #[must_use]
    pub fn raw(&self, key: &str) -> Value {
        self.0.get(key).cloned().unwrap_or(Value::Null)
    }

    /// A field as text.
    ///
    /// Strings are returned as-is, other scalars and containers in their
    /// JSON form. Absent and `null` fields are `None`.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// A field as a number.
    ///
    /// Accepts JSON numbers and numeric strings; anything else, including
    /// non-finite values, is `None`.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(coordinate_from_value)
    }

    /// Whether the body carries `key` at all, even as `null`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// A field as an identifier in text form.
    ///
    /// Only numbers and strings identify anything; `123` and `"123"` both
    /// read as `"123"`, while `123.0` reads as `"123.0"`.
    #[must_use]
    pub fn id_text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}
