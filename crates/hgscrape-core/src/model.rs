// ── Counter identity ──
//
// Every published counter is one (interface, direction) pair. The router
// exposes one WAN link, four LAN ports and two WiFi bands, which gives
// fourteen counters in total.

use std::fmt;

/// Traffic direction as seen from the router's clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Self::Up => "upload",
            Self::Down => "download",
        }
    }
}

/// One of the four physical LAN ports, numbered 1 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanPort(u8);

impl LanPort {
    pub const ALL: [LanPort; 4] = [LanPort(1), LanPort(2), LanPort(3), LanPort(4)];

    /// Returns `None` outside 1..=4.
    pub fn new(number: u8) -> Option<Self> {
        (1..=4).contains(&number).then_some(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based position in [`LanPort::ALL`].
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl fmt::Display for LanPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LAN{}", self.0)
    }
}

/// WiFi radio band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WifiBand {
    Ghz2_4,
    Ghz5,
}

impl fmt::Display for WifiBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ghz2_4 => "WIFI 2.4GHz",
            Self::Ghz5 => "WIFI 5GHz",
        })
    }
}

/// A logical interface whose traffic the router reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Interface {
    Wan,
    Lan(LanPort),
    Wifi(WifiBand),
}

impl Interface {
    /// Interface segment of the metric name (`wan`, `lan3`, `wifi_2_4ghz`).
    pub fn metric_stem(self) -> String {
        match self {
            Self::Wan => "wan".into(),
            Self::Lan(port) => format!("lan{}", port.number()),
            Self::Wifi(WifiBand::Ghz2_4) => "wifi_2_4ghz".into(),
            Self::Wifi(WifiBand::Ghz5) => "wifi_5ghz".into(),
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wan => f.write_str("WAN"),
            Self::Lan(port) => write!(f, "{port}"),
            Self::Wifi(band) => write!(f, "{band}"),
        }
    }
}

/// Identity of one published counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CounterId {
    pub interface: Interface,
    pub direction: Direction,
}

impl CounterId {
    /// Every counter the exporter publishes, in exposition order.
    pub const ALL: [CounterId; 14] = [
        Self::new(Interface::Wan, Direction::Up),
        Self::new(Interface::Wan, Direction::Down),
        Self::new(Interface::Lan(LanPort(1)), Direction::Up),
        Self::new(Interface::Lan(LanPort(1)), Direction::Down),
        Self::new(Interface::Lan(LanPort(2)), Direction::Up),
        Self::new(Interface::Lan(LanPort(2)), Direction::Down),
        Self::new(Interface::Lan(LanPort(3)), Direction::Up),
        Self::new(Interface::Lan(LanPort(3)), Direction::Down),
        Self::new(Interface::Lan(LanPort(4)), Direction::Up),
        Self::new(Interface::Lan(LanPort(4)), Direction::Down),
        Self::new(Interface::Wifi(WifiBand::Ghz2_4), Direction::Up),
        Self::new(Interface::Wifi(WifiBand::Ghz2_4), Direction::Down),
        Self::new(Interface::Wifi(WifiBand::Ghz5), Direction::Up),
        Self::new(Interface::Wifi(WifiBand::Ghz5), Direction::Down),
    ];

    pub const fn new(interface: Interface, direction: Direction) -> Self {
        Self {
            interface,
            direction,
        }
    }

    /// Full metric name: `<prefix>_<interface>_<direction>_bytes_total`.
    pub fn metric_name(self, prefix: &str) -> String {
        format!(
            "{prefix}_{}_{}_bytes_total",
            self.interface.metric_stem(),
            self.direction
        )
    }

    /// Static help text shown next to the metric.
    pub fn description(self) -> String {
        match self.interface {
            Interface::Wan => format!("Total bytes {}", self.direction.verb()),
            other => format!("{other} Total bytes {}", self.direction.verb()),
        }
    }
}

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.interface, self.direction)
    }
}
