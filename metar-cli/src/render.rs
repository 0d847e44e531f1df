//! Plain-text rendering of a decoded report.

use std::fmt;

use chrono::{DateTime, Utc};
use metar_core::{DecodedReport, RawReport};
use serde::Serialize;

const NOT_AVAILABLE: &str = "N/A";

/// Shape of `--json` output.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub raw: &'a RawReport,
    pub decoded: &'a DecodedReport,
    pub spread_c: Option<i16>,
    pub fog_risk: bool,
}

impl<'a> JsonReport<'a> {
    pub fn new(raw: &'a RawReport, decoded: &'a DecodedReport) -> Self {
        Self {
            raw,
            decoded,
            spread_c: decoded.spread(),
            fog_risk: decoded.fog_risk(),
        }
    }
}

/// Text view of a decoded report; `now` is used for the age of the issue time.
#[derive(Debug)]
pub struct ReportView<'a> {
    raw: &'a RawReport,
    report: &'a DecodedReport,
    now: DateTime<Utc>,
}

impl<'a> ReportView<'a> {
    pub fn new(raw: &'a RawReport, report: &'a DecodedReport, now: DateTime<Utc>) -> Self {
        Self { raw, report, now }
    }
}

pub fn render(raw: &RawReport, report: &DecodedReport, now: DateTime<Utc>) -> String {
    ReportView::new(raw, report, now).to_string()
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;

        let station = if report.station.is_empty() {
            "????"
        } else {
            report.station.as_str()
        };
        match report.observed {
            Some(observed) => writeln!(f, "{station}  {observed} (observation)")?,
            None => writeln!(f, "{station}  observation time unknown")?,
        }
        if let Some(issued) = self.raw.issued_at() {
            let minutes = (self.now - issued).num_minutes().max(0);
            let issued = issued.format("%Y-%m-%d %H:%M UTC");
            writeln!(f, "Issued {issued} ({minutes} min ago)")?;
        }
        writeln!(f, "Raw: {}", self.raw)?;
        writeln!(f)?;

        let temperature = match (report.temperature_c, report.spread()) {
            (Some(t), Some(spread)) => format!("{t}°C (spread {spread}°)"),
            (Some(t), None) => format!("{t}°C"),
            (None, _) => NOT_AVAILABLE.to_string(),
        };
        let pressure = match report.pressure_hpa {
            Some(q) => format!("{q} hPa"),
            None => NOT_AVAILABLE.to_string(),
        };

        writeln!(f, "{:<13}{}", "Wind", report.wind_label())?;
        writeln!(f, "{:<13}{temperature}", "Temperature")?;
        writeln!(f, "{:<13}{pressure}", "QNH")?;
        writeln!(f)?;

        writeln!(f, "Current conditions")?;
        if report.is_automated {
            writeln!(f, "  (automated station)")?;
        }
        if let Some(spread) = report.spread().filter(|_| report.fog_risk()) {
            writeln!(
                f,
                "  ⚠ Low temperature/dew point spread ({spread}°C): risk of fog or icing."
            )?;
        }
        writeln!(f, "  {:<12}{}", "Visibility", report.visibility)?;
        if report.present_weather.is_empty() {
            writeln!(f, "  {:<12}none", "Weather")?;
        } else {
            let weather = report.present_weather.join(", ");
            writeln!(f, "  {:<12}{weather}", "Weather")?;
        }
        if let Some(dew) = report.dew_point_c {
            writeln!(f, "  {:<12}{dew}°C", "Dew point")?;
        }
        if report.clouds.is_empty() {
            writeln!(f, "  {:<12}NSC / CAVOK", "Clouds")?;
        } else {
            writeln!(f, "  Clouds")?;
            for layer in &report.clouds {
                writeln!(f, "    • {layer}")?;
            }
        }
        writeln!(f)?;

        writeln!(f, "Trend (next 2 hours)")?;
        if report.trend.is_empty() {
            writeln!(f, "  No trend data in this report.")?;
        } else {
            for statement in &report.trend {
                writeln!(f, "  • {statement}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 24, 10, 42, 0).unwrap()
    }

    #[test]
    fn renders_all_sections() {
        let raw = RawReport::new("LFQQ 241030Z AUTO 32010G20KT 9999 BKN020 18/12 Q1013 NOSIG");
        let text = render(&raw, &raw.decode(), now());

        assert!(text.starts_with("LFQQ  day 24 at 10h30 UTC"));
        assert!(text.contains("Raw: LFQQ 241030Z AUTO"));
        assert!(text.contains("320° / 10 kt (gust 20)"));
        assert!(text.contains("18°C (spread 6°)"));
        assert!(text.contains("1013 hPa"));
        assert!(text.contains("(automated station)"));
        assert!(text.contains("Weather     none"));
        assert!(text.contains("• broken (5-7/8) at 2000 ft"));
        assert!(text.contains("• no significant change expected in the next 2 hours"));
        assert!(!text.contains("risk of fog"));
    }

    #[test]
    fn warns_on_small_spread() {
        let raw = RawReport::new("LFRS 241030Z 00000KT 0400 FG VV001 08/07 Q1020");
        let text = render(&raw, &raw.decode(), now());

        assert!(text.contains("spread (1°C): risk of fog or icing"));
        assert!(text.contains("Weather     fog"));
        assert!(text.contains("400 meters"));
    }

    #[test]
    fn placeholders_for_missing_fields() {
        let raw = RawReport::new("garbage");
        let text = render(&raw, &raw.decode(), now());

        assert!(text.starts_with("????  observation time unknown"));
        assert!(text.contains("Wind         undetermined"));
        assert!(text.contains("Temperature  N/A"));
        assert!(text.contains("QNH          N/A"));
        assert!(text.contains("Clouds      NSC / CAVOK"));
        assert!(text.contains("No trend data in this report."));
    }

    #[test]
    fn shows_issue_time_when_known() {
        let issued = Utc.with_ymd_and_hms(2024, 5, 24, 10, 30, 0).unwrap();
        let raw = RawReport::new("LFQQ 241030Z 9999").with_issued_at(Some(issued));
        let text = render(&raw, &raw.decode(), now());

        assert!(text.contains("Issued 2024-05-24 10:30 UTC (12 min ago)"));
    }

    #[test]
    fn view_formats_into_any_writer() {
        let raw = RawReport::new("LFPG 241030Z VRB03KT CAVOK 21/09 Q1021");
        let decoded = raw.decode();
        let view = ReportView::new(&raw, &decoded, now());

        assert_eq!(format!("{view}"), render(&raw, &decoded, now()));
        assert!(view.to_string().contains("Visibility  CAVOK (>10km)"));
        assert!(view.to_string().contains("• ceiling and visibility OK"));
    }

    #[test]
    fn json_output_carries_derived_fields() {
        let raw = RawReport::new("LFQQ 241030Z 08/07 Q1020");
        let decoded = raw.decode();
        let json = serde_json::to_value(JsonReport::new(&raw, &decoded)).unwrap();

        assert_eq!(json["decoded"]["station"], "LFQQ");
        assert_eq!(json["spread_c"], 1);
        assert_eq!(json["fog_risk"], true);
    }
}
