//! Resource record values
//!
//! A [`ResourceData`] is the configuration record a handler reads desired
//! state from and writes observed state back into. It wraps the dynamic
//! attribute map exchanged with the host runtime.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Dynamic value that can be encoded/decoded from resource state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<DynamicValue>),
    Map(BTreeMap<String, DynamicValue>),
}

impl DynamicValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, DynamicValue>> {
        match self {
            DynamicValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_map()?.get(key)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    /// True for null and for the zero value of each scalar type
    pub fn is_zero(&self) -> bool {
        match self {
            DynamicValue::Null => true,
            DynamicValue::Bool(b) => !b,
            DynamicValue::Number(n) => n.as_f64() == Some(0.0),
            DynamicValue::String(s) => s.is_empty(),
            DynamicValue::List(items) => items.is_empty(),
            DynamicValue::Map(m) => m.is_empty(),
        }
    }
}

impl Default for DynamicValue {
    fn default() -> Self {
        DynamicValue::Null
    }
}

impl From<&str> for DynamicValue {
    fn from(s: &str) -> Self {
        DynamicValue::String(s.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(s: String) -> Self {
        DynamicValue::String(s)
    }
}

impl From<&String> for DynamicValue {
    fn from(s: &String) -> Self {
        DynamicValue::String(s.clone())
    }
}

impl From<i64> for DynamicValue {
    fn from(n: i64) -> Self {
        int_value(n)
    }
}

impl From<f64> for DynamicValue {
    fn from(n: f64) -> Self {
        float_value(n)
    }
}

impl From<bool> for DynamicValue {
    fn from(b: bool) -> Self {
        DynamicValue::Bool(b)
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DynamicValue::Null)
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(items: Vec<T>) -> Self {
        DynamicValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, DynamicValue>> for DynamicValue {
    fn from(m: BTreeMap<String, DynamicValue>) -> Self {
        DynamicValue::Map(m)
    }
}

/// Decode a DynamicValue from JSON bytes
pub fn decode_dynamic_value(data: &[u8]) -> Result<DynamicValue> {
    if data.is_empty() {
        return Ok(DynamicValue::Null);
    }
    Ok(serde_json::from_slice(data)?)
}

/// Helper to extract an optional string attribute from a DynamicValue
pub fn get_optional_string_attr(value: &DynamicValue, key: &str) -> Option<String> {
    value.get(key).and_then(|v| match v {
        DynamicValue::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

/// Create a DynamicValue map with the given attributes
pub fn make_state(attrs: Vec<(&str, DynamicValue)>) -> DynamicValue {
    let mut map = BTreeMap::new();
    for (key, value) in attrs {
        map.insert(key.to_string(), value);
    }
    DynamicValue::Map(map)
}

/// Create a string DynamicValue
pub fn string_value(s: impl Into<String>) -> DynamicValue {
    DynamicValue::String(s.into())
}

/// Create a number DynamicValue from i64
pub fn int_value(n: i64) -> DynamicValue {
    DynamicValue::Number(serde_json::Number::from(n))
}

/// Create a number DynamicValue from f64
pub fn float_value(n: f64) -> DynamicValue {
    serde_json::Number::from_f64(n)
        .map(DynamicValue::Number)
        .unwrap_or(DynamicValue::Null)
}

/// Configuration record for one handler invocation.
///
/// `values` holds the planned configuration merged with whatever computed
/// attributes the handler sets. `prior` holds the last persisted state, when
/// there is one, and is only consulted for change detection.
#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    id: String,
    values: BTreeMap<String, DynamicValue>,
    prior: Option<BTreeMap<String, DynamicValue>>,
}

impl ResourceData {
    /// Record built from a configuration or state value
    pub fn new(value: DynamicValue) -> Self {
        let values = match value {
            DynamicValue::Map(m) => m,
            _ => BTreeMap::new(),
        };
        let id = values
            .get("id")
            .and_then(|v| v.as_string())
            .unwrap_or_default()
            .to_string();
        Self {
            id,
            values,
            prior: None,
        }
    }

    /// Record for an update: `prior` is the persisted state, `planned` the new configuration
    pub fn with_prior(prior: DynamicValue, planned: DynamicValue) -> Self {
        let prior_map = match prior {
            DynamicValue::Map(m) => m,
            _ => BTreeMap::new(),
        };
        let mut data = Self::new(planned);
        if data.id.is_empty() {
            if let Some(id) = prior_map.get("id").and_then(|v| v.as_string()) {
                data.set_id(id);
            }
        }
        data.prior = Some(prior_map);
        data
    }

    /// Record holding only an identity, as used by import
    pub fn from_id(id: impl Into<String>) -> Self {
        let mut data = Self::default();
        data.set_id(id);
        data
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the record identity. An empty id marks the entity as gone.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
        if self.id.is_empty() {
            self.values.remove("id");
        } else {
            self.values.insert("id".to_string(), string_value(&self.id));
        }
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn get_string(&self, key: &str) -> String {
        self.get(key)
            .and_then(|v| v.as_string())
            .unwrap_or_default()
            .to_string()
    }

    pub fn get_optional_string(&self, key: &str) -> Option<String> {
        Some(self.get_string(key)).filter(|s| !s.is_empty())
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.get_optional_int(key).unwrap_or_default()
    }

    pub fn get_optional_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    pub fn get_list(&self, key: &str) -> &[DynamicValue] {
        self.get(key).and_then(|v| v.as_list()).unwrap_or(&[])
    }

    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.get_list(key)
            .iter()
            .filter_map(|v| v.as_string())
            .map(str::to_string)
            .collect()
    }

    pub fn set(&mut self, key: &str, value: impl Into<DynamicValue>) {
        if key == "id" {
            let value = value.into();
            self.set_id(value.as_string().unwrap_or_default());
            return;
        }
        self.values.insert(key.to_string(), value.into());
    }

    /// Set several attributes at once from a flattened map
    pub fn set_all(&mut self, attrs: BTreeMap<String, DynamicValue>) {
        for (key, value) in attrs {
            self.set(&key, value);
        }
    }

    /// Whether `key` differs between the prior state and the planned values.
    ///
    /// Always false when there is no prior state. Null and absent compare equal.
    pub fn has_change(&self, key: &str) -> bool {
        let Some(prior) = &self.prior else {
            return false;
        };
        let before = prior.get(key).filter(|v| !v.is_null());
        before != self.get(key)
    }

    /// Like [`has_change`](Self::has_change) but ignores element order, for set attributes
    pub fn has_set_change(&self, key: &str) -> bool {
        let Some(prior) = &self.prior else {
            return false;
        };
        let normalize = |v: Option<&DynamicValue>| {
            let mut items: Vec<String> = v
                .and_then(|v| v.as_list())
                .unwrap_or(&[])
                .iter()
                .filter_map(|i| serde_json::to_string(i).ok())
                .collect();
            items.sort();
            items.dedup();
            items
        };
        normalize(prior.get(key)) != normalize(self.get(key))
    }

    /// Final state value for the host runtime. Null once the identity is cleared.
    pub fn into_state(self) -> DynamicValue {
        if self.id.is_empty() {
            return DynamicValue::Null;
        }
        DynamicValue::Map(self.values)
    }

    pub fn to_value(&self) -> DynamicValue {
        DynamicValue::Map(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_taken_from_values() {
        let data = ResourceData::new(make_state(vec![
            ("id", string_value("d-1")),
            ("name", string_value("data")),
        ]));
        assert_eq!(data.id(), "d-1");
        assert_eq!(data.get_string("name"), "data");
    }

    #[test]
    fn test_clearing_id_nulls_state() {
        let mut data = ResourceData::from_id("n-1");
        data.set("name", "net");
        data.set_id("");
        assert!(data.into_state().is_null());
    }

    #[test]
    fn test_has_change_tracks_prior() {
        let prior = make_state(vec![
            ("id", string_value("d-1")),
            ("name", string_value("old")),
            ("size", int_value(10)),
        ]);
        let planned = make_state(vec![
            ("name", string_value("new")),
            ("size", int_value(10)),
        ]);
        let data = ResourceData::with_prior(prior, planned);

        assert_eq!(data.id(), "d-1");
        assert!(data.has_change("name"));
        assert!(!data.has_change("size"));
        assert!(!data.has_change("tags"));
    }

    #[test]
    fn test_null_and_missing_are_equal() {
        let prior = make_state(vec![("id", string_value("n-1")), ("mtu", DynamicValue::Null)]);
        let planned = make_state(vec![("id", string_value("n-1"))]);
        let data = ResourceData::with_prior(prior, planned);
        assert!(!data.has_change("mtu"));
    }

    #[test]
    fn test_set_change_ignores_order() {
        let prior = make_state(vec![
            ("id", string_value("d-1")),
            ("tags", vec!["a", "b"].into()),
        ]);
        let planned = make_state(vec![("tags", vec!["b", "a"].into())]);
        let data = ResourceData::with_prior(prior, planned);

        assert!(data.has_change("tags"));
        assert!(!data.has_set_change("tags"));
    }

    #[test]
    fn test_json_round_trip_keeps_nesting() {
        let value = make_state(vec![(
            "subnets",
            DynamicValue::List(vec![make_state(vec![("dns", vec!["8.8.8.8"].into())])]),
        )]);
        let bytes = serde_json::to_vec(&value).unwrap();
        assert_eq!(decode_dynamic_value(&bytes).unwrap(), value);
        assert!(decode_dynamic_value(b"").unwrap().is_null());
    }
}
