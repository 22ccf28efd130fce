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

//! Application configuration management.
//!
//! Persistent configuration stored in TOML format: the flight-state API
//! endpoint, the poll period, and the rectangular region markers are
//! filtered to. Defaults match the continental-US view.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::source::DEFAULT_API_URL;
use crate::tracker::Region;

const APP_NAME: &str = "skymap-client";
const CONFIG_NAME: &str = "config";

/// Application configuration stored in TOML format.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Flight-state API endpoint to poll.
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Seconds between reconciliation passes.
    #[serde(default = "default_poll_period_secs")]
    pub poll_period_secs: u64,

    /// Southern region bound in degrees.
    #[serde(default = "default_min_lat")]
    pub min_lat: f64,

    /// Northern region bound in degrees.
    #[serde(default = "default_max_lat")]
    pub max_lat: f64,

    /// Western region bound in degrees.
    #[serde(default = "default_min_lon")]
    pub min_lon: f64,

    /// Eastern region bound in degrees.
    #[serde(default = "default_max_lon")]
    pub max_lon: f64,
}

// Default value functions for serde
fn default_source_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_poll_period_secs() -> u64 {
    30
}

fn default_min_lat() -> f64 {
    Region::CONTINENTAL_US.min_lat
}

fn default_max_lat() -> f64 {
    Region::CONTINENTAL_US.max_lat
}

fn default_min_lon() -> f64 {
    Region::CONTINENTAL_US.min_lon
}

fn default_max_lon() -> f64 {
    Region::CONTINENTAL_US.max_lon
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            poll_period_secs: default_poll_period_secs(),
            min_lat: default_min_lat(),
            max_lat: default_max_lat(),
            min_lon: default_min_lon(),
            max_lon: default_max_lon(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating a default file when absent.
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user.
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// The configured region bounds.
    #[must_use]
    pub fn region(&self) -> Region {
        Region {
            min_lat: self.min_lat,
            max_lat: self.max_lat,
            min_lon: self.min_lon,
            max_lon: self.max_lon,
        }
    }

    /// The configured poll period.
    #[must_use]
    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_period_secs)
    }
}
