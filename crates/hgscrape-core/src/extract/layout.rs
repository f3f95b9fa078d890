// ── Field layouts ──
//
// The router does not expose an API; its pages embed data records in
// JavaScript literals whose field positions are stable per firmware but
// not self-describing. Each layout below pairs one pattern with the roles
// of its capture groups, in capture order. Changing firmware means
// changing this table and nothing else.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::ExtractError;
use crate::model::LanPort;

/// Meaning of one captured numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// Upstream byte counter.
    Up,
    /// Downstream byte counter.
    Down,
    /// Router-maintained wrap count for the upstream counter.
    UpWraps,
    /// Router-maintained wrap count for the downstream counter.
    DownWraps,
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up bytes",
            Self::Down => "down bytes",
            Self::UpWraps => "up wrap counter",
            Self::DownWraps => "down wrap counter",
        })
    }
}

/// A pattern plus the roles of its capture groups.
#[derive(Debug)]
pub struct FieldLayout {
    group: String,
    pattern: Regex,
    roles: &'static [FieldRole],
}

/// Numeric fields captured from one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields {
    group: String,
    values: Vec<(FieldRole, u64)>,
}

impl Fields {
    pub fn get(&self, role: FieldRole) -> Option<u64> {
        self.values
            .iter()
            .find_map(|&(r, value)| (r == role).then_some(value))
    }

    pub fn require(&self, role: FieldRole) -> Result<u64, ExtractError> {
        self.get(role).ok_or_else(|| ExtractError::MissingField {
            group: self.group.clone(),
            role,
        })
    }
}

impl FieldLayout {
    /// Compile a layout. The pattern must have one capture group per role.
    pub fn new(group: impl Into<String>, pattern: &str, roles: &'static [FieldRole]) -> Self {
        let pattern = Regex::new(pattern).expect("field layout pattern must compile");
        debug_assert_eq!(pattern.captures_len() - 1, roles.len());
        Self {
            group: group.into(),
            pattern,
            roles,
        }
    }

    /// Human-readable name of the record group, used in errors and logs.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Fields of the first matching record.
    pub fn find_first(&self, text: &str) -> Result<Fields, ExtractError> {
        let caps = self
            .pattern
            .captures(text)
            .ok_or_else(|| ExtractError::NotFound {
                group: self.group.clone(),
            })?;
        self.fields(&caps)
    }

    /// Fields of the `index`-th matching record in document order. Only that
    /// record's numbers are parsed; `None` if there are fewer records.
    pub fn find_nth(&self, text: &str, index: usize) -> Option<Result<Fields, ExtractError>> {
        self.pattern
            .captures_iter(text)
            .nth(index)
            .map(|caps| self.fields(&caps))
    }

    /// Number of non-overlapping matching records.
    pub fn count(&self, text: &str) -> usize {
        self.pattern.captures_iter(text).count()
    }

    fn fields(&self, caps: &regex::Captures<'_>) -> Result<Fields, ExtractError> {
        let values = self
            .roles
            .iter()
            .enumerate()
            .map(|(i, &role)| {
                let raw = caps.get(i + 1).map_or("", |m| m.as_str());
                raw.parse::<u64>()
                    .map(|value| (role, value))
                    .map_err(|_| ExtractError::InvalidNumber {
                        group: self.group.clone(),
                        role,
                        value: raw.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Fields {
            group: self.group.clone(),
            values,
        })
    }
}

// ── Layout table ────────────────────────────────────────────────────

/// WAN IP connection statistics on the WAN status page.
pub static WAN: LazyLock<FieldLayout> = LazyLock::new(|| {
    FieldLayout::new(
        "WAN",
        r#"InternetGatewayDevice\.WANDevice\.1\.WANConnectionDevice\.1\.WANIPConnection\.1\.Stats","[0-9]+","([0-9]+)","[0-9]+","[0-9]+","[0-9]+","([0-9]+)"#,
        &[FieldRole::Up, FieldRole::Down],
    )
});

/// Per-port LAN statistics on the LAN hosts page, indexed by [`LanPort::index`].
///
/// Each record carries the upstream wrap count and bytes, four unrelated
/// numeric fields, then the downstream wrap count and bytes.
pub static LAN: LazyLock<[FieldLayout; 4]> = LazyLock::new(|| LanPort::ALL.map(lan_layout));

/// WLAN packet info records on the LAN hosts page, one per radio.
pub static WLAN: LazyLock<FieldLayout> = LazyLock::new(|| {
    FieldLayout::new(
        "WLAN",
        r#"new\sstPacketInfo\(".*?","([0-9]+)","[0-9]+","([0-9]+)","[0-9]+"\)"#,
        &[FieldRole::Down, FieldRole::Up],
    )
});

fn lan_layout(port: LanPort) -> FieldLayout {
    FieldLayout::new(
        format!("{port}"),
        &format!(
            r#"InternetGatewayDevice\.X_HW_DEBUG\.AMP\.LANPort\.{}\.Statistics[^0-9]+([0-9]+)[^0-9]+([0-9]+)"(?:,"[0-9]+"){{4}}[^0-9]+([0-9]+)[^0-9]+([0-9]+)"#,
            port.number()
        ),
        &[
            FieldRole::UpWraps,
            FieldRole::Up,
            FieldRole::DownWraps,
            FieldRole::Down,
        ],
    )
}
