use crate::{
    Config, FetchError, RawReport, StationCode,
    provider::{aviationweather::AviationWeatherProvider, noaa::NoaaProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug, time::Duration};
use tracing::{debug, warn};

pub mod aviationweather;
pub mod noaa;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderId {
    #[default]
    Noaa,
    AviationWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Noaa => "noaa",
            ProviderId::AviationWeather => "aviationweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Noaa, ProviderId::AviationWeather]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::Noaa => noaa::DEFAULT_BASE_URL,
            ProviderId::AviationWeather => aviationweather::DEFAULT_BASE_URL,
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "noaa" => Ok(ProviderId::Noaa),
            "aviationweather" => Ok(ProviderId::AviationWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: noaa, aviationweather."
            )),
        }
    }
}

/// A source of raw METAR lines.
#[async_trait]
pub trait MetarProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Latest METAR line for `station`.
    async fn latest(&self, station: &StationCode) -> Result<RawReport, FetchError>;
}

/// Fetches the latest report, logging and swallowing any failure.
///
/// `None` covers every cause (network error, timeout, non-success status,
/// empty body); the caller should skip decoding and report the station as
/// unavailable.
pub async fn fetch_report(
    provider: &dyn MetarProvider,
    station: &StationCode,
) -> Option<RawReport> {
    match provider.latest(station).await {
        Ok(raw) => {
            debug!(provider = %provider.id(), %station, raw = raw.as_str(), "fetched METAR");
            Some(raw)
        }
        Err(err) => {
            warn!(
                provider = %provider.id(),
                %station,
                timeout = err.is_timeout(),
                error = ?err,
                "METAR unavailable"
            );
            None
        }
    }
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn MetarProvider>> {
    let base_url = config
        .provider_base_url(id)
        .unwrap_or(id.default_base_url());
    let http = http_client(config.timeout())?;

    let boxed: Box<dyn MetarProvider> = match id {
        ProviderId::Noaa => Box::new(NoaaProvider::new(base_url, http)),
        ProviderId::AviationWeather => Box::new(AviationWeatherProvider::new(base_url, http)),
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn MetarProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    use anyhow::Context;

    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("metar-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` and return the body of a successful response.
async fn get_text(http: &Client, url: &str) -> Result<String, FetchError> {
    debug!(url, "requesting METAR");

    let res = http
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = res.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    res.text().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })
}

/// Picks the line that starts with the station code, or the last line.
pub fn select_station_line<'a>(body: &'a str, station: &StationCode) -> Option<&'a str> {
    let lines: Vec<&str> = body.trim().lines().collect();

    let line = lines
        .iter()
        .copied()
        .find(|line| line.starts_with(station.as_str()))
        .or(lines.last().copied())?
        .trim();

    (!line.is_empty()).then_some(line)
}
