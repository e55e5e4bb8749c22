use std::collections::BTreeMap;

use crate::errors::BeaconResult;

use super::{Parameter, ParameterKey, Value};

/// Mapping from parameter (keyed by wire name) to value.
///
/// Iteration order is by wire name, which keeps serialized payloads stable.
#[derive(Debug, Clone, Default)]
pub struct ParameterMap {
    entries: BTreeMap<String, (Parameter, Value)>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `parameter` to `value`, replacing any entry with the same wire name.
    ///
    /// The value is stored as given. Use [`ParameterMap::try_set`] for input
    /// that may not match the parameter's declared type.
    pub fn set(&mut self, parameter: impl Into<Parameter>, value: impl Into<Value>) {
        let parameter = parameter.into();
        self.entries
            .insert(parameter.wire_name().to_string(), (parameter, value.into()));
    }

    /// Coerce `value` to the parameter's type, then set it.
    pub fn try_set(&mut self, parameter: impl Into<Parameter>, value: impl Into<Value>) -> BeaconResult<()> {
        let parameter = parameter.into();
        let value = parameter.coerce(value.into())?;
        self.entries
            .insert(parameter.wire_name().to_string(), (parameter, value));
        Ok(())
    }

    /// Coerce every value to its parameter's declared type.
    ///
    /// On a mismatch the map is left unchanged.
    pub fn coerce_all(&mut self) -> BeaconResult<()> {
        let mut coerced = BTreeMap::new();
        for (wire_name, (parameter, value)) in &self.entries {
            let value = parameter.coerce(value.clone())?;
            coerced.insert(wire_name.clone(), (parameter.clone(), value));
        }
        self.entries = coerced;
        Ok(())
    }

    pub fn get<K: ParameterKey + ?Sized>(&self, key: &K) -> Option<&Value> {
        self.entries.get(key.key().as_ref()).map(|(_, v)| v)
    }

    pub fn contains<K: ParameterKey + ?Sized>(&self, key: &K) -> bool {
        self.entries.contains_key(key.key().as_ref())
    }

    /// Remove an entry. Removing an absent entry is a no-op.
    pub fn remove<K: ParameterKey + ?Sized>(&mut self, key: &K) -> Option<Value> {
        self.entries.remove(key.key().as_ref()).map(|(_, v)| v)
    }

    /// Copy every entry of `other` into this map, overwriting on collision.
    pub fn add_all(&mut self, other: &ParameterMap) {
        for (wire_name, entry) in &other.entries {
            self.entries.insert(wire_name.clone(), entry.clone());
        }
    }

    /// Keep only the entries for which `f` returns true.
    pub fn retain(&mut self, mut f: impl FnMut(&Parameter, &Value) -> bool) {
        self.entries.retain(|_, (p, v)| f(p, v));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Parameter, &Value)> {
        self.entries.values().map(|(p, v)| (p, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Parameter, &mut Value)> {
        self.entries.values_mut().map(|(p, v)| (&*p, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Maps are equal when they hold the same number of entries and every entry
/// of one is present in the other with an equal value.
impl PartialEq for ParameterMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(k, (_, v))| other.entries.get(k).is_some_and(|(_, ov)| ov == v))
    }
}

impl<P: Into<Parameter>, V: Into<Value>> FromIterator<(P, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (P, V)>>(iter: I) -> Self {
        let mut map = ParameterMap::new();
        map.extend(iter);
        map
    }
}

impl<P: Into<Parameter>, V: Into<Value>> Extend<(P, V)> for ParameterMap {
    fn extend<I: IntoIterator<Item = (P, V)>>(&mut self, iter: I) {
        for (p, v) in iter {
            self.set(p, v);
        }
    }
}
