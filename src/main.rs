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

//! `skymap` binary: console front end for the flight map client.
//!
//! Drives the poll/reconcile loop against a [`LogDisplay`] and exposes the
//! user input surface as stdin commands: `start`, `stop`, `find <callsign>`,
//! and `quit`.

use std::sync::{Arc, Mutex};

use clap::Parser;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use skymap_client::{
    AppConfig, FlightSource, LogDisplay, MarkerTracker, OpenSkySource, Poller,
};

#[derive(Debug, Parser)]
#[command(name = "skymap", about = "Live aircraft positions from OpenSky, reconciled to map markers")]
struct Args {
    /// Override the flight-state API URL
    #[arg(long)]
    url: Option<String>,

    /// Override the poll period in seconds
    #[arg(long)]
    period: Option<u64>,

    /// Override the southern region bound in degrees
    #[arg(long)]
    min_lat: Option<f64>,

    /// Override the northern region bound in degrees
    #[arg(long)]
    max_lat: Option<f64>,

    /// Override the western region bound in degrees
    #[arg(long)]
    min_lon: Option<f64>,

    /// Override the eastern region bound in degrees
    #[arg(long)]
    max_lon: Option<f64>,

    /// Run a single reconciliation pass and exit
    #[arg(long)]
    once: bool,
}

fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(url) = &args.url {
        config.source_url.clone_from(url);
    }
    if let Some(period) = args.period {
        config.poll_period_secs = period;
    }
    if let Some(min_lat) = args.min_lat {
        config.min_lat = min_lat;
    }
    if let Some(max_lat) = args.max_lat {
        config.max_lat = max_lat;
    }
    if let Some(min_lon) = args.min_lon {
        config.min_lon = min_lon;
    }
    if let Some(max_lon) = args.max_lon {
        config.max_lon = max_lon;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config, &args);

    if let Ok(path) = AppConfig::get_config_path() {
        info!("Using config at {}", path.display());
    }

    let source = OpenSkySource::new(config.source_url.clone());
    let tracker = Arc::new(Mutex::new(MarkerTracker::new(
        LogDisplay::new(),
        config.region(),
    )));

    if args.once {
        let snapshot = source.fetch_snapshot().await;
        let mut tracker = tracker.lock().unwrap();
        tracker.reconcile(&snapshot);
        println!("{} aircraft in region", tracker.len());
        return Ok(());
    }

    let mut poller = Poller::new(source, Arc::clone(&tracker), config.poll_period());
    poller.start();

    println!("Commands: start | stop | find <callsign> | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();

        match line {
            "" => {}
            "start" => poller.start(),
            "stop" => poller.stop(),
            "quit" | "exit" => break,
            "find" => println!("Please enter a flight number"),
            _ => match line.split_once(char::is_whitespace) {
                Some(("find", query)) => {
                    let query = query.trim();
                    if query.is_empty() {
                        println!("Please enter a flight number");
                    } else if !tracker.lock().unwrap().focus_flight(query) {
                        println!(
                            "Flight {} not found in the current region",
                            query.to_uppercase()
                        );
                    }
                }
                _ => println!("Unknown command: {line}"),
            },
        }
    }

    poller.stop();
    Ok(())
}
