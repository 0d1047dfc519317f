//! Tracks the active map and guards its one-time preparation.
//!
//! ```text
//! NoMap ──event names M──▶ Loading(M) ──prepared──▶ Ready(M)
//!                              ▲  │ failed                │
//!                              │  └──── stays Loading     │
//!                              └──── event names M2 ◀─────┘
//! ```
//!
//! Preparation itself happens elsewhere; the tracker only decides when one
//! should start and whether a finished one still matters.

use crate::assets::PrepareError;
use log::{debug, error, info};
use shared::MapInfo;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub enum MapPhase {
    NoMap,
    Loading { name: String },
    Ready(MapInfo),
}

#[derive(Debug)]
pub struct MapTracker {
    phase: MapPhase,
    /// Map names with a preparation currently running.
    in_flight: HashSet<String>,
}

impl Default for MapTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MapTracker {
    /// Tracker with no map seen yet.
    pub fn new() -> Self {
        Self {
            phase: MapPhase::NoMap,
            in_flight: HashSet::new(),
        }
    }

    /// Current state of the map lifecycle.
    pub fn phase(&self) -> &MapPhase {
        &self.phase
    }

    /// Name of the map currently being loaded or shown.
    pub fn current_name(&self) -> Option<&str> {
        match &self.phase {
            MapPhase::NoMap => None,
            MapPhase::Loading { name } => Some(name),
            MapPhase::Ready(info) => Some(&info.name),
        }
    }

    /// The map clients should be showing, once prepared.
    pub fn ready_map(&self) -> Option<&MapInfo> {
        match &self.phase {
            MapPhase::Ready(info) => Some(info),
            _ => None,
        }
    }

    /// Whether a preparation for `name` is still running.
    pub fn is_in_flight(&self, name: &str) -> bool {
        self.in_flight.contains(name)
    }

    /// Records that an event named map `name`.
    ///
    /// Returns `true` when the caller must start preparing `name`. A different
    /// map replaces the state wholesale. The current map is prepared again
    /// only if it is still loading and nothing is running for it, which is
    /// how a failed read or conversion gets retried. At most one preparation
    /// per name runs at a time.
    pub fn observe(&mut self, name: &str) -> bool {
        match &self.phase {
            MapPhase::Ready(info) if info.name == name => return false,
            MapPhase::Loading { name: current } if current == name => {}
            _ => {
                info!(
                    "Map changed from {} to {}",
                    self.current_name().unwrap_or("none"),
                    name
                );
                self.phase = MapPhase::Loading {
                    name: name.to_string(),
                };
            }
        }

        if self.in_flight.contains(name) {
            debug!("Preparation for {} already running", name);
            return false;
        }
        self.in_flight.insert(name.to_string());
        true
    }

    /// Applies a finished preparation.
    ///
    /// Returns the map that just became ready, or `None` when the result
    /// failed or belongs to a map that is no longer current.
    pub fn complete(
        &mut self,
        name: &str,
        result: Result<MapInfo, PrepareError>,
    ) -> Option<&MapInfo> {
        self.in_flight.remove(name);

        let current = matches!(&self.phase, MapPhase::Loading { name: current } if current == name);
        if !current {
            debug!("Ignoring stale preparation result for {}", name);
            return None;
        }

        match result {
            Ok(info) => {
                info!("Map {} is ready", name);
                self.phase = MapPhase::Ready(info);
                self.ready_map()
            }
            Err(e) => {
                error!("Could not prepare map {}: {}", name, e);
                None
            }
        }
    }
}
