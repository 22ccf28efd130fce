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

//! Marker reconciliation against flight-state snapshots.
//!
//! This module owns the mapping from aircraft callsign to its on-display
//! marker and keeps that mapping in sync with the most recent snapshot:
//! aircraft entering the configured region get a marker, aircraft moving
//! within it get an in-place update (so marker identity persists across
//! polls), and aircraft leaving it get removed. All display side effects go
//! through a constructor-injected [`MapDisplay`] collaborator.
//!
//! The main types are:
//! - [`Region`] - Inclusive rectangular latitude/longitude bounds
//! - [`TrackedMarker`] - Long-lived per-aircraft display state
//! - [`MarkerTracker`] - Owns the live marker set and runs reconciliation

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use log::info;

use crate::display::{MapDisplay, Position};
use crate::source::FlightRecord;

/// Inclusive rectangular latitude/longitude bounds.
///
/// A record exactly on an edge is inside the region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    /// Southern bound in degrees.
    pub min_lat: f64,
    /// Northern bound in degrees.
    pub max_lat: f64,
    /// Western bound in degrees.
    pub min_lon: f64,
    /// Eastern bound in degrees.
    pub max_lon: f64,
}

impl Region {
    /// Bounding box covering the continental United States.
    pub const CONTINENTAL_US: Self = Self {
        min_lat: 24.396_308,
        max_lat: 49.384_358,
        min_lon: -125.0,
        max_lon: -66.934_57,
    };

    /// Whether a position falls inside the region (bounds inclusive).
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::CONTINENTAL_US
    }
}

/// Display state for one currently-visible aircraft.
///
/// Created on first sighting, mutated in place on subsequent sightings, and
/// destroyed when its callsign is absent from a snapshot.
#[derive(Debug, Clone)]
pub struct TrackedMarker {
    /// Normalized callsign; also the marker's display label.
    pub callsign: String,
    /// Current position.
    pub position: Position,
    /// Icon rotation in degrees clockwise from north (0 when the aircraft
    /// did not broadcast a track).
    pub heading: f64,
    /// Barometric altitude in meters, if broadcast.
    pub altitude: Option<f64>,
    /// Ground speed in meters per second, if broadcast.
    pub velocity: Option<f64>,
    /// Timestamp of the last snapshot this aircraft appeared in.
    pub last_seen: DateTime<Utc>,
}

impl TrackedMarker {
    /// Informational popup text for this marker.
    pub fn popup_text(&self) -> String {
        let altitude = self
            .altitude
            .map_or_else(|| "N/A".to_owned(), |alt| format!("{alt:.0} m"));
        let speed = self
            .velocity
            .map_or_else(|| "N/A".to_owned(), |vel| format!("{:.0} km/h", vel * 3.6));

        format!(
            "{}\nLat: {:.4}, Lng: {:.4}\nAltitude: {} | Speed: {} | Heading: {:.0}°",
            self.callsign, self.position.lat, self.position.lon, altitude, speed, self.heading
        )
    }
}

/// Canonical callsign form used for both insertion and lookup.
fn normalize_callsign(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Owns the live callsign-to-marker mapping and reconciles it against
/// snapshots.
///
/// The invariant after every [`reconcile`](Self::reconcile) pass: the live
/// set is exactly the set of callsigns present with a valid position in the
/// most recent snapshot, intersected with the configured region. No stale or
/// duplicate markers can exist for the same callsign.
pub struct MarkerTracker<D: MapDisplay> {
    markers: HashMap<String, TrackedMarker>,
    region: Region,
    display: D,
}

impl<D: MapDisplay> std::fmt::Debug for MarkerTracker<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerTracker")
            .field("marker_count", &self.markers.len())
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl<D: MapDisplay> MarkerTracker<D> {
    /// Create a tracker drawing on the given display, filtered to the given
    /// region.
    #[must_use]
    pub fn new(display: D, region: Region) -> Self {
        Self {
            markers: HashMap::new(),
            region,
            display,
        }
    }

    /// The region markers are filtered to.
    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    /// Change the region used by subsequent reconciliation passes.
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    /// Reconcile the live marker set against a snapshot.
    ///
    /// Records without a non-blank callsign or without both coordinates are
    /// discarded, as are records outside the region. Surviving records
    /// create or update their marker; every tracked callsign absent from the
    /// snapshot is removed from the display. When one snapshot carries the
    /// same callsign twice, the later record wins.
    ///
    /// An empty snapshot (including one produced by a failed fetch) removes
    /// every marker. A failed poll is indistinguishable from "no aircraft
    /// present" by design.
    pub fn reconcile(&mut self, snapshot: &[FlightRecord]) {
        let mut seen = HashSet::new();

        for record in snapshot {
            let Some(raw_callsign) = record.callsign.as_deref() else {
                continue;
            };
            let (Some(lat), Some(lon)) = (record.latitude, record.longitude) else {
                continue;
            };
            // Records built outside the source layer may still carry NaN.
            if raw_callsign.trim().is_empty() || !lat.is_finite() || !lon.is_finite() {
                continue;
            }
            if !self.region.contains(lat, lon) {
                continue;
            }

            let callsign = normalize_callsign(raw_callsign);
            let position = Position { lat, lon };
            let heading = record.heading.unwrap_or(0.0);

            seen.insert(callsign.clone());

            if let Some(marker) = self.markers.get_mut(&callsign) {
                marker.position = position;
                marker.heading = heading;
                marker.altitude = record.altitude;
                marker.velocity = record.velocity;
                marker.last_seen = Utc::now();
                self.display.update_marker(&callsign, position, heading);
            } else {
                info!("Tracking new flight {}", callsign);
                self.display.create_marker(&callsign, position, heading);
                self.markers.insert(
                    callsign.clone(),
                    TrackedMarker {
                        callsign,
                        position,
                        heading,
                        altitude: record.altitude,
                        velocity: record.velocity,
                        last_seen: Utc::now(),
                    },
                );
            }
        }

        // Remove markers for aircraft that left the region
        let departed: Vec<String> = self
            .markers
            .keys()
            .filter(|callsign| !seen.contains(*callsign))
            .cloned()
            .collect();

        for callsign in departed {
            info!("Flight {} left the region", callsign);
            self.display.remove_marker(&callsign);
            self.markers.remove(&callsign);
        }
    }

    /// Look up a marker by callsign.
    ///
    /// The query is normalized (trimmed, uppercased) the same way callsigns
    /// are normalized at insertion, so a lookup never misses a live marker
    /// over casing or padding.
    #[must_use]
    pub fn find(&self, query: &str) -> Option<&TrackedMarker> {
        self.markers.get(&normalize_callsign(query))
    }

    /// Focus the viewport on a flight and show its popup.
    ///
    /// Returns `false` without touching any state when the flight is not in
    /// the live set; the caller is responsible for surfacing a not-found
    /// notification.
    pub fn focus_flight(&mut self, query: &str) -> bool {
        let Some(marker) = self.markers.get(&normalize_callsign(query)) else {
            return false;
        };

        let text = marker.popup_text();
        let (callsign, position) = (marker.callsign.clone(), marker.position);
        self.display.focus(&callsign, position);
        self.display.show_popup(&callsign, &text);
        true
    }

    /// Get all live markers.
    #[must_use]
    pub fn markers(&self) -> Vec<&TrackedMarker> {
        self.markers.values().collect()
    }

    /// Number of live markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether the live set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Access the display collaborator.
    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Recording mock for the display collaborator.
    #[derive(Debug, Default)]
    struct RecordingDisplay {
        created: Vec<(String, Position, f64)>,
        updated: Vec<(String, Position, f64)>,
        removed: Vec<String>,
        focused: Vec<(String, Position)>,
        popups: Vec<String>,
    }

    impl MapDisplay for RecordingDisplay {
        fn create_marker(&mut self, callsign: &str, position: Position, heading: f64) {
            self.created.push((callsign.to_owned(), position, heading));
        }

        fn update_marker(&mut self, callsign: &str, position: Position, heading: f64) {
            self.updated.push((callsign.to_owned(), position, heading));
        }

        fn remove_marker(&mut self, callsign: &str) {
            self.removed.push(callsign.to_owned());
        }

        fn focus(&mut self, callsign: &str, position: Position) {
            self.focused.push((callsign.to_owned(), position));
        }

        fn show_popup(&mut self, _callsign: &str, text: &str) {
            self.popups.push(text.to_owned());
        }
    }

    fn tracker() -> MarkerTracker<RecordingDisplay> {
        MarkerTracker::new(RecordingDisplay::default(), Region::CONTINENTAL_US)
    }

    fn record(callsign: &str, lat: f64, lon: f64) -> FlightRecord {
        FlightRecord {
            callsign: Some(callsign.to_owned()),
            latitude: Some(lat),
            longitude: Some(lon),
            heading: Some(90.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_update_remove_cycle() {
        let mut tracker = tracker();

        let snapshot = vec![FlightRecord {
            icao24: Some("a1b2c3".to_owned()),
            callsign: Some("UAL123".to_owned()),
            latitude: Some(40.0),
            longitude: Some(-100.0),
            altitude: Some(10000.0),
            velocity: Some(200.0),
            heading: Some(90.0),
        }];
        tracker.reconcile(&snapshot);

        assert_eq!(tracker.len(), 1);
        let marker = tracker.find("UAL123").unwrap();
        assert_eq!(marker.position, Position { lat: 40.0, lon: -100.0 });
        assert!((marker.heading - 90.0).abs() < f64::EPSILON);
        assert_eq!(
            tracker.display().created,
            vec![("UAL123".to_owned(), Position { lat: 40.0, lon: -100.0 }, 90.0)]
        );

        tracker.reconcile(&[]);

        assert!(tracker.is_empty());
        assert!(tracker.find("UAL123").is_none());
        assert_eq!(tracker.display().removed, vec!["UAL123".to_owned()]);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut tracker = tracker();
        let snapshot = vec![record("UAL123", 40.0, -100.0)];

        tracker.reconcile(&snapshot);
        tracker.reconcile(&snapshot);

        let display = tracker.display();
        assert_eq!(display.created.len(), 1);
        assert_eq!(display.removed.len(), 0);
        // Second pass only updates in place, with value-stable attributes.
        assert_eq!(display.updated.len(), 1);
        assert_eq!(
            display.updated[0],
            ("UAL123".to_owned(), Position { lat: 40.0, lon: -100.0 }, 90.0)
        );
        // The update re-applies the same label the marker was created with.
        assert_eq!(display.updated[0].0, display.created[0].0);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_live_set_matches_valid_in_region_records() {
        let mut tracker = tracker();

        let snapshot = vec![
            record("UAL123", 40.0, -100.0),
            record("   ", 41.0, -99.0),         // blank callsign
            record("SWA42", 10.0, -100.0),      // south of the region
            FlightRecord {
                callsign: Some("DAL77".to_owned()),
                longitude: Some(-100.0),        // latitude missing
                ..Default::default()
            },
            record("AAL9", 35.0, -90.0),
        ];
        tracker.reconcile(&snapshot);

        let mut live: Vec<&str> = tracker.markers().iter().map(|m| m.callsign.as_str()).collect();
        live.sort_unstable();
        assert_eq!(live, vec!["AAL9", "UAL123"]);
    }

    #[test]
    fn test_departed_flight_is_removed() {
        let mut tracker = tracker();

        tracker.reconcile(&[record("UAL123", 40.0, -100.0), record("AAL9", 35.0, -90.0)]);
        tracker.reconcile(&[record("AAL9", 35.1, -90.2)]);

        assert_eq!(tracker.len(), 1);
        assert!(tracker.find("UAL123").is_none());
        assert!(tracker.find("AAL9").is_some());
        assert_eq!(tracker.display().removed, vec!["UAL123".to_owned()]);
    }

    #[test]
    fn test_duplicate_callsign_later_record_wins() {
        let mut tracker = tracker();

        tracker.reconcile(&[record("AB123", 40.0, -100.0), record("AB123", 42.0, -95.0)]);

        assert_eq!(tracker.len(), 1);
        let marker = tracker.find("AB123").unwrap();
        assert_eq!(marker.position, Position { lat: 42.0, lon: -95.0 });
        // First sighting creates, the duplicate updates in place.
        assert_eq!(tracker.display().created.len(), 1);
        assert_eq!(tracker.display().updated.len(), 1);
    }

    #[test]
    fn test_region_edge_is_inclusive() {
        let region = Region::CONTINENTAL_US;
        let mut tracker = tracker();

        tracker.reconcile(&[
            record("EDGE1", region.min_lat, -100.0),
            record("EDGE2", region.max_lat, -100.0),
            record("EDGE3", 40.0, region.min_lon),
            record("EDGE4", 40.0, region.max_lon),
        ]);

        assert_eq!(tracker.len(), 4);
    }

    #[test]
    fn test_zero_coordinates_are_valid() {
        let equator = Region {
            min_lat: -10.0,
            max_lat: 10.0,
            min_lon: -10.0,
            max_lon: 10.0,
        };
        let mut tracker = MarkerTracker::new(RecordingDisplay::default(), equator);

        tracker.reconcile(&[record("QFA1", 0.0, 0.0)]);

        assert_eq!(tracker.len(), 1);
        assert!(tracker.find("QFA1").is_some());
    }

    #[test]
    fn test_nan_coordinates_are_discarded() {
        let mut tracker = tracker();

        tracker.reconcile(&[record("UAL123", f64::NAN, -100.0)]);

        assert!(tracker.is_empty());
    }

    #[test]
    fn test_callsign_normalized_at_insert_and_lookup() {
        let mut tracker = tracker();

        tracker.reconcile(&[record("  ual123  ", 40.0, -100.0)]);

        let marker = tracker.find("ual123").unwrap();
        assert_eq!(marker.callsign, "UAL123");
        assert!(tracker.find(" UAL123 ").is_some());
        // The display sees the normalized form too.
        assert_eq!(tracker.display().created[0].0, "UAL123");
    }

    #[test]
    fn test_missing_heading_defaults_to_zero() {
        let mut tracker = tracker();

        tracker.reconcile(&[FlightRecord {
            callsign: Some("UAL123".to_owned()),
            latitude: Some(40.0),
            longitude: Some(-100.0),
            ..Default::default()
        }]);

        let marker = tracker.find("UAL123").unwrap();
        assert!(marker.heading.abs() < f64::EPSILON);
        assert!((tracker.display().created[0].2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_focus_flight_found() {
        let mut tracker = tracker();
        tracker.reconcile(&[FlightRecord {
            callsign: Some("UAL123".to_owned()),
            latitude: Some(40.0),
            longitude: Some(-100.0),
            altitude: Some(10000.0),
            velocity: Some(200.0),
            heading: Some(90.0),
            ..Default::default()
        }]);

        assert!(tracker.focus_flight("ual123"));

        let display = tracker.display();
        assert_eq!(
            display.focused,
            vec![("UAL123".to_owned(), Position { lat: 40.0, lon: -100.0 })]
        );
        assert_eq!(display.popups.len(), 1);
        assert!(display.popups[0].contains("UAL123"));
        assert!(display.popups[0].contains("720 km/h"));
        assert!(display.popups[0].contains("10000 m"));
    }

    #[test]
    fn test_focus_flight_not_found() {
        let mut tracker = tracker();
        tracker.reconcile(&[record("AAL9", 35.0, -90.0)]);

        assert!(!tracker.focus_flight("UAL123"));

        let display = tracker.display();
        assert!(display.focused.is_empty());
        assert!(display.popups.is_empty());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_popup_text_without_optional_fields() {
        let marker = TrackedMarker {
            callsign: "UAL123".to_owned(),
            position: Position { lat: 40.0, lon: -100.0 },
            heading: 0.0,
            altitude: None,
            velocity: None,
            last_seen: Utc::now(),
        };

        let text = marker.popup_text();
        assert!(text.contains("Altitude: N/A"));
        assert!(text.contains("Speed: N/A"));
    }

    #[test]
    fn test_region_contains() {
        let region = Region::CONTINENTAL_US;

        assert!(region.contains(40.0, -100.0));
        assert!(region.contains(region.min_lat, region.min_lon));
        assert!(region.contains(region.max_lat, region.max_lon));
        assert!(!region.contains(region.min_lat - 0.000_001, -100.0));
        assert!(!region.contains(40.0, region.max_lon + 0.000_001));
        assert!(!region.contains(51.5, -0.1)); // London
    }
}
