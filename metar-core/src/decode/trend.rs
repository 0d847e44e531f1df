//! Two-hour trend segment (`NOSIG`, `BECMG`, `TEMPO`).

use std::sync::LazyLock;

use regex::Regex;

use super::{WIND_RE, parse_cloud, parse_visibility, phenomenon};
use crate::model::{CloudLayer, TrendKind, TrendStatement};

static TIME_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(FM|TL|AT)([0-9]{2})([0-9]{2})$").expect("valid regex"));

/// Decodes a trend segment into statements, one per `BECMG`/`TEMPO` block.
///
/// `NOSIG` anywhere in the segment wins over everything else.
pub fn analyze_trend(segment: &str) -> Vec<TrendStatement> {
    if segment.contains("NOSIG") {
        return vec![TrendStatement::NoSignificantChange];
    }

    split_blocks(segment)
        .into_iter()
        .filter_map(|block| analyze_block(&block))
        .collect()
}

/// Every `BECMG` or `TEMPO` token starts a new block.
fn split_blocks(segment: &str) -> Vec<Vec<&str>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for token in segment.split_whitespace() {
        if matches!(token, "BECMG" | "TEMPO") && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        current.push(token);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn analyze_block(tokens: &[&str]) -> Option<TrendStatement> {
    let raw = tokens.join(" ");
    let change = if raw.contains("TEMPO") {
        Some(TrendKind::Temporary)
    } else if raw.contains("BECMG") {
        Some(TrendKind::Becoming)
    } else {
        None
    };

    let details: Vec<String> = tokens.iter().filter_map(|token| detail(token)).collect();

    match (change, details.is_empty()) {
        (_, false) => Some(TrendStatement::Change { change, details }),
        (Some(change), true) => Some(TrendStatement::Undecoded { change, raw }),
        (None, true) => None,
    }
}

fn detail(token: &str) -> Option<String> {
    if matches!(token, "BECMG" | "TEMPO") {
        return None;
    }
    if let Some(caps) = TIME_MARKER_RE.captures(token) {
        let marker = match &caps[1] {
            "FM" => "from",
            "TL" => "until",
            _ => "at",
        };
        return Some(format!("{marker} {}h{} UTC", &caps[2], &caps[3]));
    }
    if let Some(visibility) = parse_visibility(token) {
        return Some(format!("visibility {visibility}"));
    }
    if WIND_RE.is_match(token) {
        return Some(format!("wind {token}"));
    }
    if token == "NSC" {
        return Some("no significant clouds".to_string());
    }
    if let Some(layer) = parse_cloud(token) {
        return Some(match layer {
            CloudLayer::SkyObscured { .. } => layer.to_string(),
            _ => format!("ceiling {layer}"),
        });
    }
    if token == "NSW" {
        return Some("end of significant weather".to_string());
    }
    if phenomenon::looks_like_weather(token, phenomenon::TREND_WEATHER_CODES) {
        return Some(phenomenon::decode_phenomenon(token));
    }
    None
}
