//! Ordered collections of observations.

use super::observation::Observation;
use crate::error::{ForecastError, Result};
use std::collections::BTreeSet;

/// An ordered sequence of observations plus time-axis metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    time_variable: Option<String>,
    periods_per_year: usize,
    observations: Vec<Observation>,
}

/// Builder for constructing a [`Dataset`].
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    time_variable: Option<String>,
    periods_per_year: usize,
    observations: Vec<Observation>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the independent variable that forms the time axis.
    pub fn time_variable(mut self, name: &str) -> Self {
        self.time_variable = Some(name.to_string());
        self
    }

    pub fn periods_per_year(mut self, periods: usize) -> Self {
        self.periods_per_year = periods;
        self
    }

    /// Append one observation built from `(name, value)` pairs.
    pub fn observation<I, S>(mut self, dependent_value: f64, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.observations
            .push(Observation::from_pairs(dependent_value, pairs));
        self
    }

    pub fn observations(mut self, observations: Vec<Observation>) -> Self {
        self.observations.extend(observations);
        self
    }

    pub fn build(self) -> Dataset {
        Dataset {
            time_variable: self.time_variable,
            periods_per_year: self.periods_per_year,
            observations: self.observations,
        }
    }
}

impl Dataset {
    /// Create a dataset. An empty or absent time variable means "infer it".
    pub fn new(
        time_variable: Option<&str>,
        periods_per_year: usize,
        observations: Vec<Observation>,
    ) -> Self {
        Self {
            time_variable: time_variable
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            periods_per_year,
            observations,
        }
    }

    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::new()
    }

    /// Regular series: `values[i]` observed at `start + i * step` on `variable`.
    pub fn from_values(variable: &str, start: f64, step: f64, values: &[f64]) -> Self {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation::new(v).with_value(variable, start + step * i as f64))
            .collect();
        Self::new(Some(variable), 0, observations)
    }

    /// Declared time variable, if any.
    pub fn time_variable(&self) -> Option<&str> {
        self.time_variable.as_deref()
    }

    pub fn periods_per_year(&self) -> usize {
        self.periods_per_year
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.observations.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Observation> {
        self.observations.iter_mut()
    }

    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// Dependent values in dataset order.
    pub fn dependent_values(&self) -> Vec<f64> {
        self.observations
            .iter()
            .map(Observation::dependent_value)
            .collect()
    }

    /// Drop the first `count` observations.
    pub fn skip(&self, count: usize) -> Self {
        Self {
            time_variable: self.time_variable.clone(),
            periods_per_year: self.periods_per_year,
            observations: self.observations.iter().skip(count).cloned().collect(),
        }
    }

    /// Sorted, de-duplicated names of every independent variable in the dataset.
    pub fn independent_variables(&self) -> Vec<String> {
        let names: BTreeSet<String> = self
            .observations
            .iter()
            .flat_map(Observation::independent_variable_names)
            .collect();
        names.into_iter().collect()
    }

    /// The declared time variable, or the only independent variable present.
    pub fn resolve_time_variable(&self) -> Result<String> {
        if let Some(name) = &self.time_variable {
            return Ok(name.clone());
        }
        let mut names = self.independent_variables();
        match names.len() {
            1 => Ok(names.remove(0)),
            0 => Err(ForecastError::illegal(
                "no independent variable available to use as the time variable",
            )),
            n => Err(ForecastError::illegal(format!(
                "time variable is ambiguous: {} independent variables ({})",
                n,
                names.join(", ")
            ))),
        }
    }

    /// Stable ascending sort on a named variable. Points lacking the
    /// variable sort last.
    pub fn sort_by_variable(&mut self, name: &str) {
        self.observations.sort_by(|a, b| {
            let a = a.independent_value(name).unwrap_or(f64::NAN);
            let b = b.independent_value(name).unwrap_or(f64::NAN);
            a.total_cmp(&b)
        });
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

impl FromIterator<Observation> for Dataset {
    fn from_iter<T: IntoIterator<Item = Observation>>(iter: T) -> Self {
        Self::new(None, 0, iter.into_iter().collect())
    }
}
