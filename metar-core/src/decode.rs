//! METAR body decoder.
//!
//! A raw line is split into its body and an optional trend segment. Every
//! whitespace token of the body is offered to the rule table in order; the first
//! rule that accepts a token consumes it and later rules never see it.
//! Tokens no rule accepts are dropped.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::model::{
    CloudLayer, Convective, Coverage, DecodedReport, ObservationTime, RawReport, Visibility, Wind,
    WindDirection,
};

pub mod phenomenon;
pub mod trend;

pub use phenomenon::decode_phenomenon;
pub use trend::analyze_trend;

static OBSERVATION_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2})([0-9]{2})([0-9]{2})Z$").expect("valid regex"));

pub(crate) static WIND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(VRB|[0-9]{3})([0-9]{2})(?:G([0-9]{2}))?KT$").expect("valid regex")
});

static WIND_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{3})V([0-9]{3})$").expect("valid regex"));

static VISIBILITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("valid regex"));

static TEMPERATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(M?[0-9]{2})/(M?[0-9]{2}|//)$").expect("valid regex")
});

static PRESSURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Q([0-9]{3,4})$").expect("valid regex"));

static CLOUD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(FEW|SCT|BKN|OVC|VV)([0-9]{3}|///)(CB|TCU)?$").expect("valid regex")
});

static TREND_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(NOSIG|BECMG|TEMPO)\b").expect("valid regex"));

/// Decoder state while the body tokens are walked.
#[derive(Debug, Default)]
struct Accumulator {
    report: DecodedReport,
    wind_range: Option<(u16, u16)>,
}

impl Accumulator {
    fn finish(self) -> DecodedReport {
        let Accumulator { mut report, wind_range } = self;
        if let Some(wind) = report.wind.as_mut() {
            wind.variable_range = wind_range;
        }
        report
    }
}

/// Tries to consume a token; returns `true` when it did.
type Rule = fn(&str, &mut Accumulator) -> bool;

const RULES: &[(&str, Rule)] = &[
    ("station", station),
    ("observation time", observation_time),
    ("automated", automated),
    ("wind", wind),
    ("wind variability", wind_variability),
    ("visibility", visibility),
    ("cavok", cavok),
    ("temperature", temperature),
    ("pressure", pressure),
    ("cloud layer", cloud_layer),
    ("present weather", present_weather),
];

/// Decodes one raw METAR line. Never fails: unknown tokens are skipped and
/// every field not found keeps its default.
pub fn decode(raw: &str) -> DecodedReport {
    let (body, trend_raw) = split_trend(raw);

    let mut acc = Accumulator::default();
    for token in body.split_whitespace() {
        match RULES.iter().find(|(_, apply)| apply(token, &mut acc)) {
            Some((rule, _)) => trace!(token, rule = *rule, "classified token"),
            None => trace!(token, "dropped unrecognized token"),
        }
    }

    let mut report = acc.finish();
    if let Some(segment) = trend_raw {
        report.trend = analyze_trend(segment);
        report.trend_raw = Some(segment.to_string());
    }
    report
}

impl RawReport {
    pub fn decode(&self) -> DecodedReport {
        decode(self.as_str())
    }
}

/// Splits `raw` at the first `NOSIG`, `BECMG` or `TEMPO` word.
pub(crate) fn split_trend(raw: &str) -> (&str, Option<&str>) {
    match TREND_START_RE.find(raw) {
        Some(m) => (&raw[..m.start()], Some(&raw[m.start()..])),
        None => (raw, None),
    }
}

/// Parses a 4-digit visibility group.
pub(crate) fn parse_visibility(token: &str) -> Option<Visibility> {
    if !VISIBILITY_RE.is_match(token) {
        return None;
    }
    if token == "9999" {
        return Some(Visibility::TenKmOrMore);
    }
    token.parse().ok().map(Visibility::Meters)
}

/// Parses a `FEW|SCT|BKN|OVC|VV` cloud group.
pub(crate) fn parse_cloud(token: &str) -> Option<CloudLayer> {
    let caps = CLOUD_RE.captures(token)?;
    let height = caps[2].parse::<u32>().ok().map(|h| h * 100);

    let layer = match &caps[1] {
        "VV" => CloudLayer::SkyObscured {
            vertical_visibility_ft: height,
        },
        code => CloudLayer::Layer {
            coverage: Coverage::from_code(code)?,
            base_ft: height,
            convective: caps.get(3).and_then(|m| Convective::from_code(m.as_str())),
        },
    };
    Some(layer)
}

fn station(token: &str, acc: &mut Accumulator) -> bool {
    let shaped = token.len() == 4 && token.chars().all(|c| c.is_ascii_alphabetic());
    if !shaped || token == "AUTO" || phenomenon::is_weather_group(token) {
        return false;
    }
    acc.report.station = token.to_string();
    true
}

fn observation_time(token: &str, acc: &mut Accumulator) -> bool {
    let Some(caps) = OBSERVATION_TIME_RE.captures(token) else {
        return false;
    };
    let (Ok(day), Ok(hour), Ok(minute)) = (
        caps[1].parse::<u8>(),
        caps[2].parse::<u8>(),
        caps[3].parse::<u8>(),
    ) else {
        return false;
    };
    acc.report.observed = Some(ObservationTime { day, hour, minute });
    true
}

fn automated(token: &str, acc: &mut Accumulator) -> bool {
    if token != "AUTO" {
        return false;
    }
    acc.report.is_automated = true;
    true
}

fn wind(token: &str, acc: &mut Accumulator) -> bool {
    let Some(caps) = WIND_RE.captures(token) else {
        return false;
    };
    let direction = match &caps[1] {
        "VRB" => WindDirection::Variable,
        deg => match deg.parse::<u16>() {
            Ok(deg) => WindDirection::Degrees(deg),
            Err(_) => return false,
        },
    };
    let Ok(speed_kt) = caps[2].parse::<u16>() else {
        return false;
    };
    let gust_kt = caps.get(3).and_then(|m| m.as_str().parse::<u16>().ok());

    acc.report.wind = Some(Wind {
        direction,
        speed_kt,
        gust_kt,
        variable_range: None,
    });
    true
}

fn wind_variability(token: &str, acc: &mut Accumulator) -> bool {
    let Some(caps) = WIND_RANGE_RE.captures(token) else {
        return false;
    };
    let (Ok(from), Ok(to)) = (caps[1].parse::<u16>(), caps[2].parse::<u16>()) else {
        return false;
    };
    acc.wind_range = Some((from, to));
    true
}

fn visibility(token: &str, acc: &mut Accumulator) -> bool {
    match parse_visibility(token) {
        Some(visibility) => {
            acc.report.visibility = visibility;
            true
        }
        None => false,
    }
}

fn cavok(token: &str, acc: &mut Accumulator) -> bool {
    if token != "CAVOK" {
        return false;
    }
    acc.report.visibility = Visibility::Cavok;
    acc.report.clouds = vec![CloudLayer::CeilingAndVisibilityOk];
    true
}

fn temperature(token: &str, acc: &mut Accumulator) -> bool {
    let Some(caps) = TEMPERATURE_RE.captures(token) else {
        return false;
    };
    let Some(temp) = parse_signed(&caps[1]) else {
        return false;
    };
    acc.report.temperature_c = Some(temp);
    acc.report.dew_point_c = parse_signed(&caps[2]);
    true
}

/// `M05` is -5; `//` is missing.
fn parse_signed(value: &str) -> Option<i16> {
    value.replace('M', "-").parse().ok()
}

fn pressure(token: &str, acc: &mut Accumulator) -> bool {
    let Some(caps) = PRESSURE_RE.captures(token) else {
        return false;
    };
    let Ok(hpa) = caps[1].parse::<u16>() else {
        return false;
    };
    acc.report.pressure_hpa = Some(hpa);
    true
}

fn cloud_layer(token: &str, acc: &mut Accumulator) -> bool {
    match parse_cloud(token) {
        Some(layer) => {
            acc.report.clouds.push(layer);
            true
        }
        None => false,
    }
}

fn present_weather(token: &str, acc: &mut Accumulator) -> bool {
    if !phenomenon::looks_like_weather(token, phenomenon::BODY_WEATHER_CODES) {
        return false;
    }
    acc.report.present_weather.push(decode_phenomenon(token));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrendStatement;
    use proptest::prelude::*;

    #[test]
    fn decodes_full_report() {
        let report = decode("LFQQ 241030Z AUTO 32010G20KT 9999 BKN020 18/12 Q1013 NOSIG");

        assert_eq!(report.station, "LFQQ");
        assert_eq!(
            report.observed,
            Some(ObservationTime {
                day: 24,
                hour: 10,
                minute: 30,
            })
        );
        assert_eq!(report.day_label(), "24");
        assert_eq!(report.time_label(), "10h30 UTC");
        assert!(report.is_automated);
        assert_eq!(report.wind_label(), "320° / 10 kt (gust 20)");
        assert_eq!(report.visibility.to_string(), ">10 km");
        assert_eq!(
            report.clouds,
            vec![CloudLayer::Layer {
                coverage: Coverage::Broken,
                base_ft: Some(2000),
                convective: None,
            }]
        );
        assert_eq!(report.temperature_c, Some(18));
        assert_eq!(report.dew_point_c, Some(12));
        assert_eq!(report.pressure_hpa, Some(1013));
        assert_eq!(report.trend_raw.as_deref(), Some("NOSIG"));
        assert_eq!(report.trend, vec![TrendStatement::NoSignificantChange]);
        assert!(report.present_weather.is_empty());
    }

    #[test]
    fn garbage_yields_default_record() {
        assert_eq!(decode("hello world 12 ??? ////"), DecodedReport::default());
        assert_eq!(decode("   "), DecodedReport::default());
    }

    #[test]
    fn visibility_keeps_plain_integer_value() {
        assert_eq!(decode("0350").visibility, Visibility::Meters(350));
        assert_eq!(decode("0350").visibility.to_string(), "350 meters");
        assert_eq!(decode("9999").visibility.to_string(), ">10 km");
        assert_eq!(decode("0000").visibility, Visibility::Meters(0));
    }

    #[test]
    fn negative_temperatures_and_missing_dew_point() {
        let report = decode("M05/M10");
        assert_eq!(report.temperature_c, Some(-5));
        assert_eq!(report.dew_point_c, Some(-10));

        let report = decode("18///");
        assert_eq!(report.temperature_c, Some(18));
        assert_eq!(report.dew_point_c, None);
    }

    #[test]
    fn convective_cloud_layer() {
        let report = decode("BKN020CB");
        let layer = report.clouds[0];
        assert_eq!(
            layer,
            CloudLayer::Layer {
                coverage: Coverage::Broken,
                base_ft: Some(2000),
                convective: Some(Convective::Cumulonimbus),
            }
        );
        assert!(layer.to_string().contains("⚠ CB"));
    }

    #[test]
    fn unknown_height_and_vertical_visibility() {
        let report = decode("OVC/// VV002 FEW015TCU");
        assert_eq!(
            report.clouds,
            vec![
                CloudLayer::Layer {
                    coverage: Coverage::Overcast,
                    base_ft: None,
                    convective: None,
                },
                CloudLayer::SkyObscured {
                    vertical_visibility_ft: Some(200),
                },
                CloudLayer::Layer {
                    coverage: Coverage::Few,
                    base_ft: Some(1500),
                    convective: Some(Convective::ToweringCumulus),
                },
            ]
        );
    }

    #[test]
    fn cavok_replaces_clouds_and_visibility() {
        let report = decode("EGLL 101220Z 24008KT CAVOK 21/09 Q1021");
        assert_eq!(report.visibility, Visibility::Cavok);
        assert_eq!(report.clouds, vec![CloudLayer::CeilingAndVisibilityOk]);
        assert!(report.present_weather.is_empty());
    }

    #[test]
    fn variable_wind_and_direction_range() {
        let report = decode("LFPG 241030Z VRB03KT 280V350");
        let wind = report.wind.expect("wind decoded");
        assert_eq!(wind.direction, WindDirection::Variable);
        assert_eq!(wind.speed_kt, 3);
        assert_eq!(wind.gust_kt, None);
        assert_eq!(wind.variable_range, Some((280, 350)));
        assert_eq!(report.wind_label(), "variable / 3 kt (varying 280V350)");
    }

    #[test]
    fn wind_range_without_wind_is_dropped() {
        assert_eq!(decode("280V350").wind, None);
    }

    #[test]
    fn present_weather_in_order() {
        let report = decode("LFRS 241030Z 27015KT 3000 -TSRA VCFG BR BKN010CB 12/11 Q1003");
        assert_eq!(report.station, "LFRS");
        assert_eq!(
            report.present_weather,
            vec![
                "light thunderstorm of rain",
                "in the vicinity of fog",
                "mist",
            ]
        );
        assert!(report.fog_risk());
    }

    #[test]
    fn vicinity_groups_keep_the_station() {
        let report = decode("LFQQ 241030Z 27015KT 3000 VCSH VCFG 12/11 Q1003");
        assert_eq!(report.station, "LFQQ");
        assert_eq!(
            report.present_weather,
            vec!["in the vicinity of showers", "in the vicinity of fog"]
        );
    }

    #[test]
    fn auto_and_weather_groups_are_not_stations() {
        let report = decode("LFQQ AUTO SHRA");
        assert_eq!(report.station, "LFQQ");
        assert!(report.is_automated);
        assert_eq!(report.present_weather, vec!["showers of rain"]);
    }

    #[test]
    fn four_letter_weather_groups_lose_to_present_weather() {
        let groups = ["SHRA", "TSRA", "FZFG", "VCSH", "VCFG", "VCTS", "VCBR"];
        for group in groups {
            let expected = vec![decode_phenomenon(group)];
            for raw in [format!("LFQQ {group}"), format!("{group} LFQQ")] {
                let report = decode(&raw);
                assert_eq!(report.station, "LFQQ", "{raw}");
                assert_eq!(report.present_weather, expected, "{raw}");
            }
        }
    }

    #[test]
    fn pressure_accepts_three_digits() {
        assert_eq!(decode("Q998").pressure_hpa, Some(998));
        assert_eq!(decode("Q10130").pressure_hpa, None);
    }

    #[test]
    fn rule_priority_decides_ambiguous_tokens() {
        // A 4-digit token is visibility, never a time or pressure.
        let report = decode("1200");
        assert_eq!(report.visibility, Visibility::Meters(1200));
        assert_eq!(report.observed, None);
        assert_eq!(report.pressure_hpa, None);
    }

    #[test]
    fn trend_segment_is_split_off_the_body() {
        let report = decode("LFQQ 241030Z 32010KT 9999 FEW030 18/12 Q1013 TEMPO 0300 BKN008");
        assert_eq!(report.visibility, Visibility::TenKmOrMore);
        assert_eq!(report.clouds.len(), 1);
        assert_eq!(report.trend_raw.as_deref(), Some("TEMPO 0300 BKN008"));
        assert_eq!(report.trend.len(), 1);
    }

    #[test]
    fn trend_keyword_needs_word_boundary() {
        let (body, trend) = split_trend("LFQQ XTEMPO 9999");
        assert_eq!(body, "LFQQ XTEMPO 9999");
        assert_eq!(trend, None);
    }

    #[test]
    fn raw_report_decodes_its_text() {
        let raw = RawReport::new("LFQQ 241030Z 9999");
        assert_eq!(raw.decode().station, "LFQQ");
    }

    /// One token per body rule; clouds and weather hold a single group so that
    /// their list order cannot depend on the token order.
    const BODY_TOKENS: &[&str] = &[
        "LFQQ",
        "241030Z",
        "AUTO",
        "32010G20KT",
        "280V350",
        "9999",
        "BKN020CB",
        "M01/M03",
        "Q1013",
        "VCSH",
    ];

    proptest! {
        #[test]
        fn decode_never_panics(raw in "\\PC{0,80}") {
            let _ = decode(&raw);
        }

        #[test]
        fn long_lowercase_words_decode_to_defaults(raw in "[a-z]{5,9}( [a-z]{5,9}){0,5}") {
            prop_assert_eq!(decode(&raw), DecodedReport::default());
        }

        #[test]
        fn token_order_does_not_change_fields(
            tokens in Just(BODY_TOKENS.to_vec()).prop_shuffle()
        ) {
            let report = decode(&tokens.join(" "));
            prop_assert_eq!(report.station.as_str(), "LFQQ");
            prop_assert_eq!(&report.present_weather, &vec!["in the vicinity of showers"]);
            prop_assert_eq!(report, decode(&BODY_TOKENS.join(" ")));
        }
    }
}
