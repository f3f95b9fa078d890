// ── Metric sinks ──
//
// The poller only ever says "counter X is now N". Where that value ends up
// is the sink's business: the `metrics` facade for the live exporter, or a
// plain map for one-shot runs and tests.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use metrics::{Counter, Unit};

use crate::model::CounterId;

/// Destination for published counter values.
///
/// Implementations must tolerate concurrent readers; `set` calls arrive
/// one at a time from the poll task.
pub trait MetricSink: Send + Sync {
    /// Set the current value of a counter.
    fn set(&self, id: CounterId, value: u64);
}

impl<T: MetricSink + ?Sized> MetricSink for &T {
    fn set(&self, id: CounterId, value: u64) {
        (**self).set(id, value);
    }
}

impl<T: MetricSink + ?Sized> MetricSink for Arc<T> {
    fn set(&self, id: CounterId, value: u64) {
        (**self).set(id, value);
    }
}

// ── Prometheus ──────────────────────────────────────────────────────

/// Sink backed by the globally installed `metrics` recorder.
///
/// Counter handles are registered (with their description) once, at
/// construction. `Counter::absolute` never lowers an exported value, so the
/// endpoint shows the maximum ever set for a counter, not the last value.
pub struct PrometheusSink {
    counters: HashMap<CounterId, Counter>,
}

impl PrometheusSink {
    /// Describe and register all fourteen counters under `prefix`.
    pub fn register(prefix: &str) -> Self {
        let counters = CounterId::ALL
            .into_iter()
            .map(|id| {
                let name = id.metric_name(prefix);
                metrics::describe_counter!(name.clone(), Unit::Bytes, id.description());
                (id, metrics::counter!(name))
            })
            .collect();
        Self { counters }
    }
}

impl MetricSink for PrometheusSink {
    fn set(&self, id: CounterId, value: u64) {
        if let Some(counter) = self.counters.get(&id) {
            counter.absolute(value);
        }
    }
}

// ── In-memory ───────────────────────────────────────────────────────

/// Sink that keeps the latest value of every counter in memory.
pub struct MemorySink {
    prefix: String,
    values: Mutex<BTreeMap<CounterId, u64>>,
}

impl MemorySink {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            values: Mutex::new(BTreeMap::new()),
        }
    }

    // The map only holds plain values, so a poisoned lock is still consistent.
    fn lock_values(&self) -> MutexGuard<'_, BTreeMap<CounterId, u64>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest published value, if the counter was ever set.
    pub fn get(&self, id: CounterId) -> Option<u64> {
        self.lock_values().get(&id).copied()
    }

    /// All published values in exposition order.
    pub fn snapshot(&self) -> Vec<(CounterId, u64)> {
        self.lock_values()
            .iter()
            .map(|(&id, &value)| (id, value))
            .collect()
    }

    /// Render published values in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (id, value) in self.snapshot() {
            let name = id.metric_name(&self.prefix);
            let _ = writeln!(out, "# HELP {name} {}", id.description());
            let _ = writeln!(out, "# TYPE {name} counter");
            let _ = writeln!(out, "{name} {value}");
        }
        out
    }
}

impl MetricSink for MemorySink {
    fn set(&self, id: CounterId, value: u64) {
        self.lock_values().insert(id, value);
    }
}
