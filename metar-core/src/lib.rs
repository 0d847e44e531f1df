//! Core library for the `metar` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Providers that fetch raw METAR lines over HTTP
//! - The METAR decoder (body fields, present weather, trend)
//! - Shared domain models (raw and decoded reports)
//!
//! It is used by `metar-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod decode;
pub mod error;
pub mod model;
pub mod provider;

pub use config::{Config, ProviderConfig};
pub use decode::{analyze_trend, decode, decode_phenomenon};
pub use error::FetchError;
pub use model::{
    CloudLayer, Convective, Coverage, DecodedReport, ObservationTime, RawReport, StationCode,
    TrendKind, TrendStatement, Visibility, Wind, WindDirection,
};
pub use provider::{MetarProvider, ProviderId, fetch_report};
