// ── Counter reconstruction ──
//
// The router's counters are 32-bit, occasionally read as zero, and wrap
// silently. A metrics counter must never go backwards. Each interface
// family gets its own rule:
//
// - LAN: the router reports its own wrap count, so the total is exact.
// - WAN: no wrap count is reported; a decrease bumps a multiplier that
//   scales the raw value. This is a heuristic and only sees one wrap per
//   tick.
// - WiFi: values are already cumulative; a zero reading is a firmware
//   glitch and is dropped.

use crate::extract::LanSample;
use crate::model::Direction;

/// Span of one LAN counter wrap.
const WRAP_SPAN: u128 = 1 << 32;

fn saturate(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Total bytes for a LAN counter: `wraps * 2^32 + bytes`.
pub fn lan_total(sample: LanSample) -> u64 {
    saturate(u128::from(sample.wraps) * WRAP_SPAN + u128::from(sample.bytes))
}

/// Value to publish for a WiFi counter, or `None` to leave the previous
/// value in place.
pub fn wifi_value(raw: u64) -> Option<u64> {
    (raw > 0).then_some(raw)
}

/// Wrap tracking for one WAN direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WanCounterState {
    multiplier: u64,
    previous_raw: u64,
}

impl Default for WanCounterState {
    fn default() -> Self {
        Self {
            multiplier: 1,
            previous_raw: 0,
        }
    }
}

impl WanCounterState {
    /// Number of wraps believed to have happened, plus one.
    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    /// Raw value seen on the previous observation.
    pub fn previous_raw(&self) -> u64 {
        self.previous_raw
    }

    /// Record a raw reading and return the value to publish.
    ///
    /// With `tracking` off the multiplier stays at 1 and the raw value is
    /// published as-is, decreases included.
    pub fn observe(&mut self, raw: u64, tracking: bool) -> u64 {
        if tracking && raw < self.previous_raw {
            self.multiplier = self.multiplier.saturating_add(1);
        }
        self.previous_raw = raw;
        saturate(u128::from(raw) * u128::from(self.multiplier))
    }
}

/// Process-lifetime reconstruction state, owned by the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructionState {
    wan_multiplier: bool,
    wan_up: WanCounterState,
    wan_down: WanCounterState,
}

impl ReconstructionState {
    pub fn new(wan_multiplier: bool) -> Self {
        Self {
            wan_multiplier,
            wan_up: WanCounterState::default(),
            wan_down: WanCounterState::default(),
        }
    }

    pub fn wan(&self, direction: Direction) -> &WanCounterState {
        match direction {
            Direction::Up => &self.wan_up,
            Direction::Down => &self.wan_down,
        }
    }

    /// Feed one WAN reading through the multiplier heuristic.
    pub fn wan_total(&mut self, direction: Direction, raw: u64) -> u64 {
        let tracking = self.wan_multiplier;
        let state = match direction {
            Direction::Up => &mut self.wan_up,
            Direction::Down => &mut self.wan_down,
        };
        state.observe(raw, tracking)
    }
}
