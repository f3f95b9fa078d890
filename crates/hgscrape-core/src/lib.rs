//! Counter reconstruction engine between `hgscrape-api` and the metrics endpoint.
//!
//! This crate owns the domain model and the per-tick pipeline of the
//! exporter:
//!
//! - **[`extract`]**: Declarative table of field layouts evaluated against
//!   the decoded router pages. Yields raw WAN, per-port LAN and WLAN readings;
//!   each group fails independently.
//!
//! - **[`reconstruct`]**: Turns raw readings into counter values that never
//!   go backwards: wrap-counter offsets for LAN, the multiplier heuristic for
//!   WAN ([`ReconstructionState`]), zero suppression for WiFi.
//!
//! - **[`MetricSink`]**: "Set the current value of counter X". Backed by the
//!   `metrics` facade ([`PrometheusSink`]) or an in-memory map ([`MemorySink`]).
//!
//! - **[`Poller`]**: Drives fetch, extract, reconstruct and publish once per
//!   tick and owns the reconstruction state for the process lifetime. Pages
//!   come from any [`PageSource`]; [`RouterSource`] logs into the real router.

pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod poller;
pub mod reconstruct;
pub mod sink;
pub mod source;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ExporterConfig, RouterConfig};
pub use error::CoreError;
pub use extract::ExtractError;
pub use model::{CounterId, Direction, Interface, LanPort, WifiBand};
pub use poller::{Poller, TickReport};
pub use reconstruct::{ReconstructionState, WanCounterState};
pub use sink::{MemorySink, MetricSink, PrometheusSink};
pub use source::{PageSource, RouterPages, RouterSource};
