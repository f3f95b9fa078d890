// ── Extraction of raw readings from router pages ──
//
// Each group (WAN, one LAN port, WLAN) is extracted independently so a
// firmware quirk in one record never hides the others.

pub mod layout;

use thiserror::Error;

use crate::model::LanPort;
use layout::FieldRole;

/// Why a group could not be read from a page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("{group} record not found")]
    NotFound { group: String },

    #[error("{group} {role} is not a valid counter: {value:?}")]
    InvalidNumber {
        group: String,
        role: FieldRole,
        value: String,
    },

    #[error("{group} record has no {role} field")]
    MissingField { group: String, role: FieldRole },

    #[error("expected at least {required} {group} records, found {found}")]
    TooFewRecords {
        group: String,
        required: usize,
        found: usize,
    },
}

// ── Readings ────────────────────────────────────────────────────────

/// Raw WAN byte counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WanReading {
    pub up: u64,
    pub down: u64,
}

/// One LAN counter as the router reports it: a 32-bit byte count plus the
/// number of times it has wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanSample {
    pub wraps: u64,
    pub bytes: u64,
}

/// Raw counters for one LAN port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanReading {
    pub up: LanSample,
    pub down: LanSample,
}

/// Raw counters for one WiFi band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandReading {
    pub up: u64,
    pub down: u64,
}

/// Raw counters for the two published WiFi bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WlanReading {
    pub band_2_4: BandReading,
    pub band_5: BandReading,
}

/// Outcome of extracting every LAN port; one entry per [`LanPort`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanReadings([Result<LanReading, ExtractError>; 4]);

impl LanReadings {
    pub fn port(&self, port: LanPort) -> Result<&LanReading, &ExtractError> {
        self.0[port.index()].as_ref()
    }

    /// Ports paired with their outcome, in port order.
    pub fn iter(&self) -> impl Iterator<Item = (LanPort, &Result<LanReading, ExtractError>)> {
        LanPort::ALL.into_iter().zip(self.0.iter())
    }
}

// ── Record positions ────────────────────────────────────────────────

/// WLAN record holding the 2.4GHz band.
const WLAN_2_4_RECORD: usize = 0;
/// WLAN record holding the 5GHz band. Record 1 is a band that is not published.
const WLAN_5_RECORD: usize = 2;

// ── Extractors ──────────────────────────────────────────────────────

/// Read the WAN counters from the WAN status page.
pub fn extract_wan(text: &str) -> Result<WanReading, ExtractError> {
    let fields = layout::WAN.find_first(text)?;
    Ok(WanReading {
        up: fields.require(FieldRole::Up)?,
        down: fields.require(FieldRole::Down)?,
    })
}

/// Read every LAN port from the LAN hosts page. A missing port yields an
/// error in its own slot only.
pub fn extract_lan(text: &str) -> LanReadings {
    LanReadings(LanPort::ALL.map(|port| extract_lan_port(text, port)))
}

/// Read a single LAN port from the LAN hosts page.
pub fn extract_lan_port(text: &str, port: LanPort) -> Result<LanReading, ExtractError> {
    let fields = layout::LAN[port.index()].find_first(text)?;
    Ok(LanReading {
        up: LanSample {
            wraps: fields.require(FieldRole::UpWraps)?,
            bytes: fields.require(FieldRole::Up)?,
        },
        down: LanSample {
            wraps: fields.require(FieldRole::DownWraps)?,
            bytes: fields.require(FieldRole::Down)?,
        },
    })
}

/// Read the 2.4GHz and 5GHz counters from the WLAN records embedded in the
/// LAN hosts page.
pub fn extract_wlan(text: &str) -> Result<WlanReading, ExtractError> {
    let band = |index: usize| -> Result<BandReading, ExtractError> {
        let fields = layout::WLAN
            .find_nth(text, index)
            .ok_or_else(|| ExtractError::TooFewRecords {
                group: layout::WLAN.group().to_owned(),
                required: WLAN_5_RECORD + 1,
                found: layout::WLAN.count(text),
            })??;
        Ok(BandReading {
            up: fields.require(FieldRole::Up)?,
            down: fields.require(FieldRole::Down)?,
        })
    };

    Ok(WlanReading {
        band_2_4: band(WLAN_2_4_RECORD)?,
        band_5: band(WLAN_5_RECORD)?,
    })
}
