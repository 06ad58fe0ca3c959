//! Single data records: one dependent value plus named independent values.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

/// Synchronized map of independent variable names to values.
///
/// Each `get`/`set` takes the lock on its own, so a single field read or write
/// is safe from several threads. Nothing ties two calls together: reading two
/// fields in a row may observe a write that landed in between.
#[derive(Debug, Default)]
pub struct IndependentValues {
    inner: RwLock<HashMap<String, f64>>,
}

impl IndependentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a named variable, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.inner.read().get(name).copied()
    }

    /// Insert or overwrite a named variable.
    pub fn set(&self, name: &str, value: f64) {
        self.inner.write().insert(name.to_string(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().contains_key(name)
    }

    /// Variable names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Owned copy of the current contents.
    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.inner.read().clone()
    }
}

impl Clone for IndependentValues {
    fn clone(&self) -> Self {
        Self {
            inner: RwLock::new(self.snapshot()),
        }
    }
}

impl PartialEq for IndependentValues {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.snapshot() == other.snapshot()
    }
}

impl From<HashMap<String, f64>> for IndependentValues {
    fn from(values: HashMap<String, f64>) -> Self {
        Self {
            inner: RwLock::new(values),
        }
    }
}

/// One data row: the dependent (target) value and its independent values.
///
/// Cloning deep-copies the independent values, so a clone never shares
/// state with the original.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Observation {
    dependent_value: f64,
    independent_values: IndependentValues,
}

impl Observation {
    /// Create an observation without independent values.
    pub fn new(dependent_value: f64) -> Self {
        Self {
            dependent_value,
            independent_values: IndependentValues::new(),
        }
    }

    /// Create an observation from `(name, value)` pairs.
    pub fn from_pairs<I, S>(dependent_value: f64, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let values: HashMap<String, f64> =
            pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            dependent_value,
            independent_values: values.into(),
        }
    }

    /// Chainable setter for an independent value.
    pub fn with_value(self, name: &str, value: f64) -> Self {
        self.independent_values.set(name, value);
        self
    }

    pub fn dependent_value(&self) -> f64 {
        self.dependent_value
    }

    pub fn set_dependent_value(&mut self, value: f64) {
        self.dependent_value = value;
    }

    pub fn independent_value(&self, name: &str) -> Option<f64> {
        self.independent_values.get(name)
    }

    pub fn set_independent_value(&self, name: &str, value: f64) {
        self.independent_values.set(name, value);
    }

    pub fn independent_values(&self) -> &IndependentValues {
        &self.independent_values
    }

    pub fn independent_variable_names(&self) -> Vec<String> {
        self.independent_values.names()
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dependent={}", self.dependent_value)?;
        let values = self.independent_values.snapshot();
        let mut names: Vec<&String> = values.keys().collect();
        names.sort();
        for name in names {
            write!(f, ", {}={}", name, values[name])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn clone_does_not_alias_independent_values() {
        let original = Observation::new(1.0).with_value("t", 3.0);
        let copy = original.clone();

        copy.set_independent_value("t", 99.0);

        assert_eq!(original.independent_value("t"), Some(3.0));
        assert_eq!(copy.independent_value("t"), Some(99.0));
    }

    #[test]
    fn display_lists_variables_in_name_order() {
        let obs = Observation::from_pairs(2.5, [("x", 1.0), ("t", 4.0)]);
        assert_eq!(obs.to_string(), "dependent=2.5, t=4, x=1");
    }

    #[test]
    fn equality_is_structural() {
        let a = Observation::from_pairs(1.0, [("t", 1.0)]);
        let b = Observation::new(1.0).with_value("t", 1.0);
        assert_eq!(a, b);

        let c = Observation::from_pairs(1.0, [("t", 2.0)]);
        assert_ne!(a, c);
    }

    #[test]
    fn names_are_sorted() {
        let obs = Observation::from_pairs(0.0, [("b", 1.0), ("a", 2.0)]);
        assert_eq!(obs.independent_variable_names(), vec!["a", "b"]);
        assert_eq!(obs.independent_values().len(), 2);
    }

    #[test]
    fn concurrent_single_field_access() {
        let obs = Arc::new(Observation::new(0.0).with_value("t", 0.0));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let obs = Arc::clone(&obs);
                thread::spawn(move || {
                    for j in 0..100 {
                        let name = format!("v{}", i);
                        obs.set_independent_value(&name, j as f64);
                        assert!(obs.independent_value("t").is_some());
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(obs.independent_values().len(), 5);
        assert_eq!(obs.independent_value("v0"), Some(99.0));
    }
}
