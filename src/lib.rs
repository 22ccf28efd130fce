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

//! Live flight map client library.
//!
//! Polls a public flight-state API and reconciles each snapshot against a
//! keyed set of persistent map markers, creating, updating, and removing
//! them as aircraft enter, move within, and leave a geographic region. The
//! layers can be used independently or composed together:
//!
//! - **Source layer**: snapshot fetching ([`source`], OpenSky state vectors)
//! - **Tracker layer**: marker reconciliation and lookup ([`tracker`])
//! - **Display layer**: the map-surface capability seam ([`display`])
//! - **Poll layer**: start/stop lifecycle of the periodic pass ([`poll`])
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//!
//! use skymap_client::{
//!     LogDisplay, MarkerTracker, OpenSkySource, Poller, Region, DEFAULT_API_URL,
//!     DEFAULT_POLL_PERIOD,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let tracker = Arc::new(Mutex::new(MarkerTracker::new(
//!         LogDisplay::new(),
//!         Region::CONTINENTAL_US,
//!     )));
//!
//!     let mut poller = Poller::new(
//!         OpenSkySource::new(DEFAULT_API_URL),
//!         Arc::clone(&tracker),
//!         DEFAULT_POLL_PERIOD,
//!     );
//!     poller.start();
//!
//!     tokio::time::sleep(DEFAULT_POLL_PERIOD).await;
//!     println!("{} aircraft on display", tracker.lock().unwrap().len());
//! }
//! ```
//!
//! # Using the Reconciler Directly
//!
//! ```
//! use skymap_client::{FlightRecord, LogDisplay, MarkerTracker, Region};
//!
//! let mut tracker = MarkerTracker::new(LogDisplay::new(), Region::CONTINENTAL_US);
//!
//! tracker.reconcile(&[FlightRecord {
//!     callsign: Some("UAL123".to_owned()),
//!     latitude: Some(40.0),
//!     longitude: Some(-100.0),
//!     heading: Some(90.0),
//!     ..Default::default()
//! }]);
//!
//! assert!(tracker.find("ual123").is_some());
//! ```

pub mod config;
pub mod display;
pub mod poll;
pub mod source;
pub mod tracker;

pub use config::AppConfig;
pub use display::{LogDisplay, MapDisplay, Position};
pub use poll::{Poller, DEFAULT_POLL_PERIOD};
pub use source::{FetchError, FlightRecord, FlightSource, OpenSkySource, DEFAULT_API_URL};
pub use tracker::{MarkerTracker, Region, TrackedMarker};
