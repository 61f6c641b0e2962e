//! Power unit conversions.

/// Unit in which a power figure (e.g. OIP2) is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerUnit {
    /// Watts.
    #[default]
    Watt,
    /// Decibels relative to one milliwatt.
    Dbm,
}

impl PowerUnit {
    /// Express a power given in watts in this unit.
    pub fn from_watts(self, watts: f64) -> f64 {
        match self {
            PowerUnit::Watt => watts,
            PowerUnit::Dbm => watts_to_dbm(watts),
        }
    }

    /// Unit suffix for display.
    pub fn symbol(self) -> &'static str {
        match self {
            PowerUnit::Watt => "W",
            PowerUnit::Dbm => "dBm",
        }
    }
}

/// Convert watts to dBm: 10·log10(1000·P).
pub fn watts_to_dbm(watts: f64) -> f64 {
    10.0 * (watts * 1000.0).log10()
}

/// Convert dBm to watts.
pub fn dbm_to_watts(dbm: f64) -> f64 {
    10f64.powf(dbm * 0.1) / 1000.0
}
