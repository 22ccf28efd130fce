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

//! Map display collaborator seam.
//!
//! The reconciler never draws anything itself; it drives marker lifecycle
//! side effects through the [`MapDisplay`] trait. A real map widget
//! implements this trait, and tests substitute a recording mock. The
//! capability set is deliberately minimal: create/update/remove a marker,
//! move the viewport, and anchor an informational popup to a marker.

use log::info;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

/// Capability interface for the map surface the markers live on.
///
/// The marker key doubles as its display label (fixed styling): the
/// `callsign` argument carries the label on both creation and update.
/// Headings are degrees clockwise from north and rotate the marker icon.
pub trait MapDisplay {
    /// Place a new marker on the map, labeled with its callsign.
    fn create_marker(&mut self, callsign: &str, position: Position, heading: f64);

    /// Move and re-rotate an existing marker in place, re-applying the
    /// callsign label. The label is value-stable for a given marker since
    /// the key and the label are the same normalized string.
    fn update_marker(&mut self, callsign: &str, position: Position, heading: f64);

    /// Detach a marker from the map.
    fn remove_marker(&mut self, callsign: &str);

    /// Pan and zoom the viewport to a marker.
    fn focus(&mut self, callsign: &str, position: Position);

    /// Show an informational popup anchored to a marker.
    fn show_popup(&mut self, callsign: &str, text: &str);
}

/// Console rendition of the display collaborator.
///
/// Logs every marker operation instead of drawing it. Used by the `skymap`
/// binary so the reconciliation loop can be observed without a map widget.
#[derive(Debug, Default)]
pub struct LogDisplay;

impl LogDisplay {
    /// Create a new console display.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MapDisplay for LogDisplay {
    fn create_marker(&mut self, callsign: &str, position: Position, heading: f64) {
        info!(
            "+ {} at ({:.4}, {:.4}) heading {:.0}",
            callsign, position.lat, position.lon, heading
        );
    }

    fn update_marker(&mut self, callsign: &str, position: Position, heading: f64) {
        info!(
            "~ {} at ({:.4}, {:.4}) heading {:.0}",
            callsign, position.lat, position.lon, heading
        );
    }

    fn remove_marker(&mut self, callsign: &str) {
        info!("- {}", callsign);
    }

    fn focus(&mut self, callsign: &str, position: Position) {
        info!("focus {} at ({:.4}, {:.4})", callsign, position.lat, position.lon);
    }

    fn show_popup(&mut self, _callsign: &str, text: &str) {
        println!("{}", text);
    }
}
