use std::fmt;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A validated ICAO station identifier, always upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StationCode(String);

impl StationCode {
    pub const DEFAULT: &'static str = "LFQQ";

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StationCode {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for StationCode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_uppercase();

        if code.len() != 4 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(anyhow!(
                "Invalid station code '{value}'. Expected a 4-character ICAO code, e.g. LFQQ."
            ));
        }

        Ok(Self(code))
    }
}

/// The unparsed METAR line as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawReport {
    text: String,
    issued_at: Option<DateTime<Utc>>,
}

impl RawReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            issued_at: None,
        }
    }

    pub fn with_issued_at(mut self, issued_at: Option<DateTime<Utc>>) -> Self {
        self.issued_at = issued_at;
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Issue time from the endpoint's header line, when it sends one.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }
}

impl fmt::Display for RawReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Day of month and UTC time of day from a `DDHHMMZ` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObservationTime {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl ObservationTime {
    /// Time of day rendered as `HHhMM UTC`.
    pub fn time_label(&self) -> String {
        format!("{:02}h{:02} UTC", self.hour, self.minute)
    }
}

impl fmt::Display for ObservationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {:02} at {}", self.day, self.time_label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindDirection {
    Variable,
    Degrees(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Wind {
    pub direction: WindDirection,
    pub speed_kt: u16,
    pub gust_kt: Option<u16>,
    /// Extreme directions of a `DDDVDDD` group.
    pub variable_range: Option<(u16, u16)>,
}

impl fmt::Display for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            WindDirection::Variable => f.write_str("variable")?,
            WindDirection::Degrees(deg) => write!(f, "{deg:03}°")?,
        }
        write!(f, " / {} kt", self.speed_kt)?;
        if let Some(gust) = self.gust_kt {
            write!(f, " (gust {gust})")?;
        }
        if let Some((from, to)) = self.variable_range {
            write!(f, " (varying {from:03}V{to:03})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Undetermined,
    Meters(u32),
    /// `9999`
    TenKmOrMore,
    Cavok,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Undetermined => f.write_str("undetermined"),
            Visibility::Meters(m) => write!(f, "{m} meters"),
            Visibility::TenKmOrMore => f.write_str(">10 km"),
            Visibility::Cavok => f.write_str("CAVOK (>10km)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    Few,
    Scattered,
    Broken,
    Overcast,
}

impl Coverage {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "FEW" => Some(Coverage::Few),
            "SCT" => Some(Coverage::Scattered),
            "BKN" => Some(Coverage::Broken),
            "OVC" => Some(Coverage::Overcast),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Coverage::Few => "few (1-2/8)",
            Coverage::Scattered => "scattered (3-4/8)",
            Coverage::Broken => "broken (5-7/8)",
            Coverage::Overcast => "overcast (8/8)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Convective {
    Cumulonimbus,
    ToweringCumulus,
}

impl Convective {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CB" => Some(Convective::Cumulonimbus),
            "TCU" => Some(Convective::ToweringCumulus),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Convective::Cumulonimbus => "CB",
            Convective::ToweringCumulus => "TCU",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CloudLayer {
    Layer {
        coverage: Coverage,
        /// `None` when the height group is `///`.
        base_ft: Option<u32>,
        convective: Option<Convective>,
    },
    /// `VV` group: sky obscured, height is the vertical visibility.
    SkyObscured { vertical_visibility_ft: Option<u32> },
    /// Set by `CAVOK`.
    CeilingAndVisibilityOk,
}

impl CloudLayer {
    pub fn is_convective(&self) -> bool {
        match self {
            CloudLayer::Layer { convective, .. } => convective.is_some(),
            _ => false,
        }
    }
}

impl fmt::Display for CloudLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudLayer::Layer {
                coverage,
                base_ft,
                convective,
            } => {
                f.write_str(coverage.as_str())?;
                match base_ft {
                    Some(ft) => write!(f, " at {ft} ft")?,
                    None => f.write_str(" at unknown height")?,
                }
                if let Some(cb) = convective {
                    write!(f, " ⚠ {}", cb.code())?;
                }
                Ok(())
            }
            CloudLayer::SkyObscured {
                vertical_visibility_ft: Some(ft),
            } => write!(f, "sky obscured (vertical visibility {ft} ft)"),
            CloudLayer::SkyObscured {
                vertical_visibility_ft: None,
            } => f.write_str("sky obscured (height unknown)"),
            CloudLayer::CeilingAndVisibilityOk => f.write_str("ceiling and visibility OK"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendKind {
    /// `TEMPO`
    Temporary,
    /// `BECMG`
    Becoming,
}

impl TrendKind {
    pub fn label(&self) -> &'static str {
        match self {
            TrendKind::Temporary => "temporary fluctuation (<1h)",
            TrendKind::Becoming => "progressive/lasting change",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendStatement {
    NoSignificantChange,
    Change {
        change: Option<TrendKind>,
        details: Vec<String>,
    },
    /// A labelled sub-block in which no token could be decoded.
    Undecoded { change: TrendKind, raw: String },
}

impl TrendStatement {
    pub const NO_SIGNIFICANT_CHANGE: &'static str =
        "no significant change expected in the next 2 hours";

    pub fn kind(&self) -> Option<TrendKind> {
        match self {
            TrendStatement::NoSignificantChange => None,
            TrendStatement::Change { change, .. } => *change,
            TrendStatement::Undecoded { change, .. } => Some(*change),
        }
    }
}

impl fmt::Display for TrendStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendStatement::NoSignificantChange => f.write_str(Self::NO_SIGNIFICANT_CHANGE),
            TrendStatement::Change {
                change: Some(kind),
                details,
            } => write!(f, "{}: {}", kind.label(), details.join(", ")),
            TrendStatement::Change {
                change: None,
                details,
            } => f.write_str(&details.join(", ")),
            TrendStatement::Undecoded { change, raw } => {
                write!(f, "{} (undecoded: {raw})", change.label())
            }
        }
    }
}

/// Everything the decoder could extract from one raw line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DecodedReport {
    /// Empty when no station token was found.
    pub station: String,
    pub observed: Option<ObservationTime>,
    pub is_automated: bool,
    pub wind: Option<Wind>,
    pub visibility: Visibility,
    pub present_weather: Vec<String>,
    pub clouds: Vec<CloudLayer>,
    pub temperature_c: Option<i16>,
    pub dew_point_c: Option<i16>,
    pub pressure_hpa: Option<u16>,
    pub trend_raw: Option<String>,
    pub trend: Vec<TrendStatement>,
}

impl DecodedReport {
    /// Temperature minus dew point, when both are known.
    pub fn spread(&self) -> Option<i16> {
        Some(self.temperature_c? - self.dew_point_c?)
    }

    /// Fog or icing is likely when the spread is 2 °C or less.
    pub fn fog_risk(&self) -> bool {
        self.spread().is_some_and(|s| s <= 2)
    }

    pub fn wind_label(&self) -> String {
        match self.wind {
            Some(wind) => wind.to_string(),
            None => "undetermined".to_string(),
        }
    }

    pub fn day_label(&self) -> String {
        match self.observed {
            Some(observed) => format!("{:02}", observed.day),
            None => "unknown".to_string(),
        }
    }

    pub fn time_label(&self) -> String {
        match self.observed {
            Some(observed) => observed.time_label(),
            None => "unknown".to_string(),
        }
    }
}
