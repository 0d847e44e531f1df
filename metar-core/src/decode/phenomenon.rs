//! Present-weather groups: intensity, descriptor and phenomenon codes.

const INTENSITIES: &[(&str, &str)] = &[
    ("-", "light"),
    ("+", "heavy"),
    ("VC", "in the vicinity of"),
];

const DESCRIPTORS: &[(&str, &str)] = &[
    ("MI", "thin"),
    ("BC", "patches"),
    ("PR", "partial"),
    ("DR", "low drifting"),
    ("BL", "blowing"),
    ("SH", "showers"),
    ("TS", "thunderstorm"),
    ("FZ", "freezing"),
];

const PHENOMENA: &[(&str, &str)] = &[
    ("DZ", "drizzle"),
    ("RA", "rain"),
    ("SN", "snow"),
    ("SG", "snow grains"),
    ("IC", "ice crystals"),
    ("PL", "ice pellets"),
    ("GR", "hail"),
    ("GS", "small hail/snow pellets"),
    ("UP", "unknown precipitation"),
    ("BR", "mist"),
    ("FG", "fog"),
    ("FU", "smoke"),
    ("VA", "volcanic ash"),
    ("DU", "dust"),
    ("SA", "sand"),
    ("HZ", "haze"),
    ("PY", "spray"),
    ("PO", "dust whirls"),
    ("SQ", "squall"),
    ("FC", "funnel cloud"),
    ("SS", "sandstorm"),
    ("DS", "duststorm"),
    ("NSW", "end of significant weather"),
];

/// Codes that mark a body token as a present-weather group.
pub(crate) const BODY_WEATHER_CODES: &[&str] =
    &["DZ", "RA", "SN", "GR", "BR", "FG", "FU", "HZ", "TS", "SH"];

/// Codes that mark a trend token as a present-weather group.
pub(crate) const TREND_WEATHER_CODES: &[&str] = &["RA", "SN", "FG", "BR", "TS", "SH", "DZ"];

fn lookup(table: &[(&str, &'static str)], code: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == code).map(|(_, v)| *v)
}

/// Removes a leading intensity marker, returning its phrase and the rest.
pub(crate) fn strip_intensity(token: &str) -> (Option<&'static str>, &str) {
    INTENSITIES
        .iter()
        .find_map(|(prefix, phrase)| Some((Some(*phrase), token.strip_prefix(prefix)?)))
        .unwrap_or((None, token))
}

fn strip_descriptor(token: &str) -> (Option<&'static str>, &str) {
    match token.get(..2).and_then(|head| lookup(DESCRIPTORS, head)) {
        Some(phrase) => (Some(phrase), &token[2..]),
        None => (None, token),
    }
}

/// True when the token, minus any intensity marker, contains one of `codes`.
pub(crate) fn looks_like_weather(token: &str, codes: &[&str]) -> bool {
    let (_, rest) = strip_intensity(token);
    codes.iter().any(|code| rest.contains(code))
}

/// True when the whole token, minus any intensity marker, is a descriptor
/// and/or a run of phenomenon codes, e.g. `SHRA`, `FZFG`, `RASN`, `VCSH`.
pub(crate) fn is_weather_group(token: &str) -> bool {
    let (_, group) = strip_intensity(token);
    let (descriptor, mut rest) = strip_descriptor(group);
    if rest.is_empty() {
        return descriptor.is_some();
    }
    while !rest.is_empty() {
        match rest.get(..2).and_then(|head| lookup(PHENOMENA, head)) {
            Some(_) => rest = &rest[2..],
            None => return false,
        }
    }
    true
}

/// Decodes a present-weather group such as `-TSRA` into an English phrase.
///
/// Unknown phenomenon codes are kept verbatim. A lone descriptor (`TS`,
/// `VCSH`) is rendered on its own.
pub fn decode_phenomenon(token: &str) -> String {
    let (intensity, rest) = strip_intensity(token);
    let (descriptor, rest) = strip_descriptor(rest);

    let mut words: Vec<String> = Vec::with_capacity(3);
    if let Some(intensity) = intensity {
        words.push(intensity.to_string());
    }
    match descriptor {
        Some(descriptor) if rest.is_empty() => words.push(descriptor.to_string()),
        Some(descriptor) => words.push(format!("{descriptor} of")),
        None => {}
    }
    if !rest.is_empty() {
        words.push(lookup(PHENOMENA, rest).unwrap_or(rest).to_string());
    }

    words.join(" ")
}
