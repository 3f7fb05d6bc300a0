use indexmap::IndexMap;

use crate::{Error, Result, Value};

/// Key collecting positional tokens that no declared argument consumed.
pub const UNUSED_ARGUMENTS: &str = "unused_arguments";

/// The parsed values, keyed by parameter name.
///
/// Every declared parameter has an entry, `None` when nothing supplied a
/// value and there was no default.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    values: IndexMap<String, Option<Value>>,
}

impl Options {
    pub fn new(values: IndexMap<String, Option<Value>>) -> Options {
        Options { values }
    }

    /// The value of `key`, `None` if it is unset or was never declared.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).and_then(Option::as_ref)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Like [`Options::get`], but a never declared `key` is an error.
    pub fn value(&self, key: &str) -> Result<Option<&Value>> {
        match self.values.get(key) {
            Some(it) => Ok(it.as_ref()),
            None => Err(Error::UnknownParameter(key.to_string())),
        }
    }

    /// Whether `key` holds a truthy value; a never declared `key` is an error.
    pub fn query(&self, key: &str) -> Result<bool> {
        Ok(self.value(key)?.map_or(false, Value::is_truthy))
    }

    /// Whether `key` holds a truthy value, `false` for anything missing.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).map_or(false, Value::is_truthy)
    }

    /// The value under `key`. A parameter that was declared but ended up
    /// without a value counts as missing, like a never declared one.
    pub fn fetch(&self, key: &str) -> Result<&Value> {
        self.get(key).ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Falls back to `default` for a missing key, including a declared but
    /// unset one.
    pub fn fetch_or(&self, key: &str, default: impl Into<Value>) -> Value {
        match self.get(key) {
            Some(it) => it.clone(),
            None => default.into(),
        }
    }

    pub fn fetch_or_else<F>(&self, key: &str, f: F) -> Value
    where
        F: FnOnce(&str) -> Value,
    {
        match self.get(key) {
            Some(it) => it.clone(),
            None => f(key),
        }
    }

    pub fn unused_arguments(&self) -> &[String] {
        self.get(UNUSED_ARGUMENTS).and_then(Value::as_array).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    pub fn into_map(self) -> IndexMap<String, Option<Value>> {
        self.values
    }
}
