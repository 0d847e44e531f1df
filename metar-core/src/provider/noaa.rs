use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;

use crate::{FetchError, RawReport, StationCode};

use super::{MetarProvider, ProviderId, get_text, select_station_line};

pub const DEFAULT_BASE_URL: &str = "https://tgftp.nws.noaa.gov/data/observations/metar/stations";

/// NOAA station files: `{base}/{ICAO}.TXT`, a timestamp line followed by the
/// METAR line.
#[derive(Debug, Clone)]
pub struct NoaaProvider {
    base_url: String,
    http: Client,
}

impl NoaaProvider {
    pub fn new(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn station_url(&self, station: &StationCode) -> String {
        format!("{}/{}.TXT", self.base_url, station)
    }
}

#[async_trait]
impl MetarProvider for NoaaProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Noaa
    }

    async fn latest(&self, station: &StationCode) -> Result<RawReport, FetchError> {
        let body = get_text(&self.http, &self.station_url(station)).await?;

        let Some(line) = select_station_line(&body, station) else {
            return Err(FetchError::Empty {
                station: station.to_string(),
            });
        };

        Ok(RawReport::new(line).with_issued_at(parse_issued_at(&body)))
    }
}

/// First line of a station file, e.g. `2024/05/24 10:30`.
fn parse_issued_at(body: &str) -> Option<DateTime<Utc>> {
    let header = body.trim().lines().next()?.trim();
    NaiveDateTime::parse_from_str(header, "%Y/%m/%d %H:%M")
        .ok()
        .map(|ndt| ndt.and_utc())
}
