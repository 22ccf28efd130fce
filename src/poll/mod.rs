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

//! Poll scheduling and lifecycle control.
//!
//! A [`Poller`] is either idle or polling. Starting it runs an immediate
//! reconciliation pass and then a fixed-period repeating pass from a single
//! background task, so two passes can never run concurrently (no overlapping
//! fetches, no interleaved mutations of the live set). Starting while
//! already polling is a no-op; stopping only prevents future passes from
//! starting, and a pass already under way runs to completion and still
//! applies its side effects.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::info;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::display::MapDisplay;
use crate::source::FlightSource;
use crate::tracker::MarkerTracker;

/// Default period between reconciliation passes.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(30);

/// Repeatedly fetches snapshots and reconciles them against the live marker
/// set.
pub struct Poller<S, D>
where
    S: FlightSource + Send + Sync + 'static,
    D: MapDisplay + Send + 'static,
{
    source: Arc<S>,
    tracker: Arc<Mutex<MarkerTracker<D>>>,
    period: Duration,
    cancel_token: Option<CancellationToken>,
}

impl<S, D> std::fmt::Debug for Poller<S, D>
where
    S: FlightSource + Send + Sync + 'static,
    D: MapDisplay + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("period", &self.period)
            .field("polling", &self.cancel_token.is_some())
            .finish_non_exhaustive()
    }
}

impl<S, D> Poller<S, D>
where
    S: FlightSource + Send + Sync + 'static,
    D: MapDisplay + Send + 'static,
{
    /// Create an idle poller.
    #[must_use]
    pub fn new(source: S, tracker: Arc<Mutex<MarkerTracker<D>>>, period: Duration) -> Self {
        Self {
            source: Arc::new(source),
            tracker,
            period,
            cancel_token: None,
        }
    }

    /// Start polling: one immediate pass, then one pass per period.
    ///
    /// Idempotent; calling it while already polling does nothing.
    pub fn start(&mut self) {
        if self.cancel_token.is_some() {
            return;
        }

        info!("Starting polling every {} seconds", self.period.as_secs());

        let token = CancellationToken::new();
        let task_cancel = token.clone();
        let source = Arc::clone(&self.source);
        let tracker = Arc::clone(&self.tracker);
        let period = self.period;

        tokio::spawn(async move {
            poll_loop(source, tracker, period, task_cancel).await;
        });

        self.cancel_token = Some(token);
    }

    /// Stop polling.
    ///
    /// Only future passes are prevented; a fetch already in flight completes
    /// and applies its reconciliation.
    pub fn stop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            info!("Stopping polling");
            token.cancel();
        }
    }

    /// Whether the poller is currently in the polling state.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.cancel_token.is_some()
    }
}

impl<S, D> Drop for Poller<S, D>
where
    S: FlightSource + Send + Sync + 'static,
    D: MapDisplay + Send + 'static,
{
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}

async fn poll_loop<S, D>(
    source: Arc<S>,
    tracker: Arc<Mutex<MarkerTracker<D>>>,
    period: Duration,
    cancel_token: CancellationToken,
) where
    S: FlightSource + Send + Sync,
    D: MapDisplay + Send,
{
    // The first tick fires immediately; Skip keeps passes strictly
    // sequential when a fetch outlasts the period.
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            () = cancel_token.cancelled() => {
                info!("Poll loop cancelled");
                return;
            }
        }

        // Cancellation is only observed at the tick boundary above, so a
        // pass that has started always applies its reconciliation.
        let snapshot = source.fetch_snapshot().await;
        if let Ok(mut tracker) = tracker.lock() {
            tracker.reconcile(&snapshot);
        }
    }
}
