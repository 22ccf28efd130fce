// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Flight-state source layer.
//!
//! This module provides a trait-based abstraction over remote flight-state
//! feeds. Currently implements the OpenSky Network REST API, which returns
//! one heterogeneous positional array per broadcasting aircraft.
//!
//! A source never surfaces fetch failures to the poll loop: a transient
//! outage degrades to an empty snapshot and is reported through the log,
//! so the worst case is "no aircraft shown" rather than a crashed pass.

mod opensky;

pub use opensky::{OpenSkySource, DEFAULT_API_URL};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while fetching a snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response body: {0}")]
    Body(#[from] serde_json::Error),
}

/// One aircraft's state as reported by a single snapshot.
///
/// Records are ephemeral: a fresh batch is produced per poll and nothing is
/// retained between polls. Every field is optional because the upstream feed
/// reports `null` for anything the aircraft did not broadcast. Presence is
/// always modeled with `Option`, never a truthiness check, so a legitimate
/// position on the equator or prime meridian (0.0) is not mistaken for
/// "missing".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightRecord {
    /// ICAO 24-bit transponder address (hex string).
    pub icao24: Option<String>,
    /// Callsign as broadcast, typically padded with trailing spaces.
    pub callsign: Option<String>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// Barometric altitude in meters.
    pub altitude: Option<f64>,
    /// Ground speed in meters per second.
    pub velocity: Option<f64>,
    /// True track in degrees clockwise from north.
    pub heading: Option<f64>,
}

/// Trait for remote flight-state sources.
///
/// One invocation is one attempt: no retry, no backoff. Implementations must
/// recover from their own failures and return an empty snapshot instead of
/// erroring.
#[async_trait]
pub trait FlightSource {
    /// Fetch a snapshot of all currently known aircraft states.
    async fn fetch_snapshot(&self) -> Vec<FlightRecord>;
}
