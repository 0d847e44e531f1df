use async_trait::async_trait;
use reqwest::Client;

use crate::{FetchError, RawReport, StationCode};

use super::{MetarProvider, ProviderId, get_text, select_station_line};

pub const DEFAULT_BASE_URL: &str = "https://aviationweather.gov/api/data/metar";

/// aviationweather.gov data API in raw text format.
#[derive(Debug, Clone)]
pub struct AviationWeatherProvider {
    base_url: String,
    http: Client,
}

impl AviationWeatherProvider {
    pub fn new(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn station_url(&self, station: &StationCode) -> String {
        format!("{}?ids={}&format=raw", self.base_url, station)
    }
}

#[async_trait]
impl MetarProvider for AviationWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::AviationWeather
    }

    async fn latest(&self, station: &StationCode) -> Result<RawReport, FetchError> {
        let body = get_text(&self.http, &self.station_url(station)).await?;

        // The API answers 200 with an empty body for unknown stations.
        let Some(line) = select_station_line(&body, station) else {
            return Err(FetchError::Empty {
                station: station.to_string(),
            });
        };

        Ok(RawReport::new(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_server;
    use std::time::Duration;

    #[test]
    fn station_url_has_raw_format() {
        let provider = AviationWeatherProvider::new(DEFAULT_BASE_URL, Client::new());
        let station = StationCode::try_from("egll").unwrap();
        assert_eq!(
            provider.station_url(&station),
            "https://aviationweather.gov/api/data/metar?ids=EGLL&format=raw"
        );
    }

    #[tokio::test]
    async fn fetches_raw_line_without_header() {
        let base = test_server::serve_once(
            "200 OK",
            "EGLL 101220Z 24008KT CAVOK 21/09 Q1021 NOSIG\n",
        )
        .await;
        let http = test_server::client(Duration::from_secs(5));
        let provider = AviationWeatherProvider::new(&base, http);
        let station = StationCode::try_from("EGLL").unwrap();

        let raw = provider.latest(&station).await.expect("report");
        assert_eq!(raw.as_str(), "EGLL 101220Z 24008KT CAVOK 21/09 Q1021 NOSIG");
        assert_eq!(raw.issued_at(), None);
    }

    #[tokio::test]
    async fn unknown_station_is_empty() {
        let base = test_server::serve_once("200 OK", "").await;
        let http = test_server::client(Duration::from_secs(5));
        let provider = AviationWeatherProvider::new(&base, http);
        let station = StationCode::try_from("ZZZZ").unwrap();

        let err = provider.latest(&station).await.unwrap_err();
        assert!(matches!(err, FetchError::Empty { .. }));
    }
}
