//! Optional-field accessors over loosely structured JSON
//!
//! Every navigation step answers present/absent instead of failing, and the
//! collection helpers fold absence (or a value of the wrong shape) into an
//! empty default. Upstream documents change shape without notice; callers walk
//! them with these helpers and never index directly.

use serde_json::{Map, Value};

static EMPTY_ARRAY: Vec<Value> = Vec::new();

pub trait ValueExt {
    /// Member of an object, `None` for missing keys and non-objects
    fn field(&self, key: &str) -> Option<&Value>;

    /// Follow a chain of object keys
    fn path(&self, keys: &[&str]) -> Option<&Value>;

    /// Array items, empty when absent or not an array
    fn items(&self) -> &[Value];

    /// Object members, `None` when not an object
    fn members(&self) -> Option<&Map<String, Value>>;

    /// String member, `None` when missing or not a string
    fn str_field(&self, key: &str) -> Option<&str>;

    /// Wrap a single value as a one-element list; arrays pass through
    fn as_list(&self) -> &[Value];
}

impl ValueExt for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    fn path(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().try_fold(self, |current, key| current.field(key))
    }

    fn items(&self) -> &[Value] {
        self.as_array().map(Vec::as_slice).unwrap_or(&EMPTY_ARRAY)
    }

    fn members(&self) -> Option<&Map<String, Value>> {
        self.as_object()
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    fn as_list(&self) -> &[Value] {
        match self {
            Value::Array(items) => items.as_slice(),
            other => std::slice::from_ref(other),
        }
    }
}

/// Array items under an optional value
pub fn items_of(value: Option<&Value>) -> &[Value] {
    value.map(ValueExt::items).unwrap_or(&EMPTY_ARRAY)
}
