// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use bulwark_types::traits::metrics::{Counter, Gauge, Histogram, Metrics};

/// Recorded values, keyed by metric name
#[derive(Default, Debug)]
struct Inner {
    /// counter totals
    counters: HashMap<String, usize>,
    /// latest gauge values
    gauges: HashMap<String, usize>,
    /// histogram points
    histograms: HashMap<String, Vec<f64>>,
}

/// [`Metrics`] recording every value in memory. Clones share the recorded values.
#[derive(Clone, Debug, Default)]
pub struct TestMetrics {
    /// name of this metric, prefixed by its subgroups
    prefix: String,
    /// values shared by every metric created from the same root
    values: Arc<Mutex<Inner>>,
}

impl TestMetrics {
    /// A metric named `name` inside this group
    fn sub(&self, name: String) -> Self {
        let prefix = if self.prefix.is_empty() {
            name
        } else {
            format!("{}-{name}", self.prefix)
        };
        Self {
            prefix,
            values: Arc::clone(&self.values),
        }
    }

    /// Run `f` on the recorded values
    fn with_values<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut values)
    }

    /// Total of the counter `name`, zero if it was never added to
    #[must_use]
    pub fn counter(&self, name: &str) -> usize {
        self.with_values(|values| values.counters.get(name).copied().unwrap_or_default())
    }

    /// Latest value of the gauge `name`
    #[must_use]
    pub fn gauge(&self, name: &str) -> Option<usize> {
        self.with_values(|values| values.gauges.get(name).copied())
    }

    /// Points recorded by the histogram `name`
    #[must_use]
    pub fn histogram(&self, name: &str) -> Vec<f64> {
        self.with_values(|values| values.histograms.get(name).cloned().unwrap_or_default())
    }
}

impl Metrics for TestMetrics {
    fn create_counter(&self, name: String, _unit_label: Option<String>) -> Box<dyn Counter> {
        Box::new(self.sub(name))
    }

    fn create_gauge(&self, name: String, _unit_label: Option<String>) -> Box<dyn Gauge> {
        Box::new(self.sub(name))
    }

    fn create_histogram(&self, name: String, _unit_label: Option<String>) -> Box<dyn Histogram> {
        Box::new(self.sub(name))
    }

    fn subgroup(&self, subgroup_name: String) -> Box<dyn Metrics> {
        Box::new(self.sub(subgroup_name))
    }
}

impl Counter for TestMetrics {
    fn add(&self, amount: usize) {
        self.with_values(|values| {
            *values.counters.entry(self.prefix.clone()).or_default() += amount;
        });
    }
}

impl Gauge for TestMetrics {
    fn set(&self, amount: usize) {
        self.with_values(|values| {
            values.gauges.insert(self.prefix.clone(), amount);
        });
    }
}

impl Histogram for TestMetrics {
    fn add_point(&self, point: f64) {
        self.with_values(|values| {
            values
                .histograms
                .entry(self.prefix.clone())
                .or_default()
                .push(point);
        });
    }
}
