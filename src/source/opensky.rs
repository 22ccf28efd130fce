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

//! OpenSky Network REST source.
//!
//! Fetches `/api/states/all` and maps its "state vector" arrays into
//! [`FlightRecord`]s. Each state vector is a positionally-indexed JSON array
//! mixing strings, numbers, booleans, and nulls:
//!
//! ```text
//! [icao24, callsign, origin_country, time_position, last_contact,
//!  longitude, latitude, baro_altitude, on_ground, velocity, true_track, ...]
//! ```
//!
//! Fields at unexpected positions or of unexpected types simply come back
//! as `None`; record validity is the reconciler's concern, not the parser's.

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use super::{FetchError, FlightRecord, FlightSource};

/// Default OpenSky endpoint returning all currently broadcasting aircraft.
pub const DEFAULT_API_URL: &str = "https://opensky-network.org/api/states/all";

// State vector indices, per the OpenSky REST API documentation.
const IDX_ICAO24: usize = 0;
const IDX_CALLSIGN: usize = 1;
const IDX_LONGITUDE: usize = 5;
const IDX_LATITUDE: usize = 6;
const IDX_BARO_ALTITUDE: usize = 7;
const IDX_VELOCITY: usize = 9;
const IDX_TRUE_TRACK: usize = 10;

/// Response envelope for `/api/states/all`.
///
/// `states` is `null` when no aircraft are known, which we treat the same as
/// an empty list.
#[derive(Debug, Deserialize)]
struct StatesResponse {
    states: Option<Vec<Vec<Value>>>,
}

/// Flight-state source backed by the OpenSky Network REST API.
#[derive(Debug)]
pub struct OpenSkySource {
    client: reqwest::Client,
    url: String,
}

impl OpenSkySource {
    /// Create a source for the given endpoint URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// The endpoint this source polls.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn try_fetch(&self) -> Result<Vec<FlightRecord>, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let envelope: StatesResponse = serde_json::from_str(&body)?;

        let states = envelope.states.unwrap_or_default();
        debug!("Fetched {} state vectors from {}", states.len(), self.url);

        Ok(states.iter().map(|state| record_from_state(state)).collect())
    }
}

impl Default for OpenSkySource {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[async_trait]
impl FlightSource for OpenSkySource {
    async fn fetch_snapshot(&self) -> Vec<FlightRecord> {
        match self.try_fetch().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Error fetching flight data: {}", e);
                Vec::new()
            }
        }
    }
}

/// Convert one raw state vector into a record.
fn record_from_state(state: &[Value]) -> FlightRecord {
    FlightRecord {
        icao24: string_field(state, IDX_ICAO24),
        callsign: string_field(state, IDX_CALLSIGN),
        latitude: float_field(state, IDX_LATITUDE),
        longitude: float_field(state, IDX_LONGITUDE),
        altitude: float_field(state, IDX_BARO_ALTITUDE),
        velocity: float_field(state, IDX_VELOCITY),
        heading: float_field(state, IDX_TRUE_TRACK),
    }
}

fn string_field(state: &[Value], index: usize) -> Option<String> {
    state
        .get(index)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

fn float_field(state: &[Value], index: usize) -> Option<f64> {
    state
        .get(index)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: Value) -> Vec<Value> {
        value.as_array().expect("state vector literal").clone()
    }

    #[test]
    fn test_record_from_full_state() {
        let state = state(json!([
            "a1b2c3", "UAL123  ", "United States", 1700000000, 1700000005,
            -100.0, 40.0, 10000.0, false, 200.0, 90.0, 0.0
        ]));
        let record = record_from_state(&state);

        assert_eq!(record.icao24.as_deref(), Some("a1b2c3"));
        assert_eq!(record.callsign.as_deref(), Some("UAL123  "));
        assert_eq!(record.latitude, Some(40.0));
        assert_eq!(record.longitude, Some(-100.0));
        assert_eq!(record.altitude, Some(10000.0));
        assert_eq!(record.velocity, Some(200.0));
        assert_eq!(record.heading, Some(90.0));
    }

    #[test]
    fn test_record_with_null_fields() {
        let state = state(json!([
            "a1b2c3", null, "France", null, null,
            null, null, null, true, null, null
        ]));
        let record = record_from_state(&state);

        assert!(record.callsign.is_none());
        assert!(record.latitude.is_none());
        assert!(record.longitude.is_none());
        assert!(record.altitude.is_none());
        assert!(record.heading.is_none());
    }

    #[test]
    fn test_zero_coordinates_are_present() {
        // A position on the equator/prime meridian must not be dropped.
        let state = state(json!([
            "a1b2c3", "QFA1", "Australia", null, null,
            0.0, 0.0, 11000.0, false, 250.0, 180.0
        ]));
        let record = record_from_state(&state);

        assert_eq!(record.latitude, Some(0.0));
        assert_eq!(record.longitude, Some(0.0));
    }

    #[test]
    fn test_short_state_vector() {
        let state = state(json!(["a1b2c3", "UAL123"]));
        let record = record_from_state(&state);

        assert_eq!(record.callsign.as_deref(), Some("UAL123"));
        assert!(record.latitude.is_none());
        assert!(record.longitude.is_none());
    }

    #[test]
    fn test_wrong_type_fields_are_absent() {
        // Latitude reported as a string is malformed data, not a position.
        let state = state(json!([
            12345, "UAL123", "United States", null, null,
            "-100.0", "40.0", null, false, null, null
        ]));
        let record = record_from_state(&state);

        assert!(record.icao24.is_none());
        assert!(record.latitude.is_none());
        assert!(record.longitude.is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_empty() {
        // Nothing listens on port 1, so the request fails outright; the
        // failure must stay inside the source and yield an empty snapshot.
        let source = OpenSkySource::new("http://127.0.0.1:1/api/states/all");
        assert!(source.fetch_snapshot().await.is_empty());
    }

    #[test]
    fn test_envelope_with_null_states() {
        let envelope: StatesResponse =
            serde_json::from_str(r#"{"time": 1700000000, "states": null}"#).unwrap();
        assert!(envelope.states.is_none());
    }

    #[test]
    fn test_envelope_with_states() {
        let envelope: StatesResponse = serde_json::from_str(
            r#"{"time": 1700000000, "states": [["a1b2c3", "UAL123  ", "US", null, null, -100.0, 40.0, 10000.0, false, 200.0, 90.0]]}"#,
        )
        .unwrap();

        let states = envelope.states.unwrap();
        assert_eq!(states.len(), 1);
        let record = record_from_state(&states[0]);
        assert_eq!(record.latitude, Some(40.0));
    }
}
