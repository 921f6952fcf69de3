//! Per-station timelines, created lazily and rebuilt when an owner's station set changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::order::ProductionOrder;
use super::timeline::{ProductionTimeline, TimelineRecord};
use crate::config::TimelineConfig;
use crate::core::SchedulerError;
use crate::infra::store::{load_typed, save_typed, DurableStore};
use crate::util::serde::{OwnerId, StationId};

/// Store key prefix for timeline records.
pub const TIMELINE_KEY_PREFIX: &str = "timeline:";

/// Store key for the owner → stations index.
pub const REGISTRY_KEY: &str = "registry:stations";

/// Store key of the timeline for `station`.
#[must_use]
pub fn timeline_key(station: &str) -> String {
    format!("{TIMELINE_KEY_PREFIX}{station}")
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryIndex {
    owners: BTreeMap<OwnerId, Vec<StationId>>,
}

/// Every timeline in the colony, keyed by station.
#[derive(Debug, Clone)]
pub struct TimelineRegistry {
    config: TimelineConfig,
    timelines: BTreeMap<StationId, ProductionTimeline>,
    station_owner: BTreeMap<StationId, OwnerId>,
    owners: BTreeMap<OwnerId, Vec<StationId>>,
}

impl TimelineRegistry {
    /// Empty registry.
    #[must_use]
    pub const fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            timelines: BTreeMap::new(),
            station_owner: BTreeMap::new(),
            owners: BTreeMap::new(),
        }
    }

    /// Timeline settings applied to new timelines.
    #[must_use]
    pub const fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Record the stations `owner` has this tick.
    ///
    /// The first observation of an owner only registers its stations. After that,
    /// any change to the station set resets every timeline of the owner (vanished
    /// stations included) and returns the drained orders for requeueing.
    pub fn observe(&mut self, owner: &str, stations: &[StationId]) -> Vec<ProductionOrder> {
        let mut current: Vec<StationId> = stations.to_vec();
        current.sort();
        current.dedup();

        let mut drained = Vec::new();
        match self.owners.get(owner) {
            Some(previous) if *previous == current => return drained,
            Some(previous) => {
                info!(
                    owner,
                    before = previous.len(),
                    after = current.len(),
                    "station set changed; rebuilding timelines"
                );
                for station in previous.clone() {
                    if let Some(timeline) = self.timelines.get_mut(&station) {
                        drained.extend(timeline.reset());
                    }
                    if !current.contains(&station) {
                        self.timelines.remove(&station);
                        self.station_owner.remove(&station);
                    }
                }
            }
            None => {}
        }

        for station in &current {
            self.get_or_create(owner, station);
        }
        if current.is_empty() {
            self.owners.remove(owner);
        } else {
            self.owners.insert(owner.to_owned(), current);
        }
        drained
    }

    /// The timeline for `station`, created on first use.
    pub fn get_or_create(&mut self, owner: &str, station: &str) -> &mut ProductionTimeline {
        self.station_owner
            .entry(station.to_owned())
            .or_insert_with(|| owner.to_owned());
        let config = &self.config;
        self.timelines
            .entry(station.to_owned())
            .or_insert_with(|| ProductionTimeline::new(station, config))
    }

    /// Timeline for `station`, if one exists.
    #[must_use]
    pub fn timeline(&self, station: &str) -> Option<&ProductionTimeline> {
        self.timelines.get(station)
    }

    /// Mutable timeline for a station that has already been observed.
    pub fn timeline_mut(&mut self, station: &str) -> Result<&mut ProductionTimeline, SchedulerError> {
        self.timelines
            .get_mut(station)
            .ok_or_else(|| SchedulerError::UnknownStation(station.to_owned()))
    }

    /// Every timeline belonging to `owner`, in station order.
    pub fn timelines_for_owner_mut(&mut self, owner: &str) -> Vec<&mut ProductionTimeline> {
        let station_owner = &self.station_owner;
        self.timelines
            .iter_mut()
            .filter(|(station, _)| station_owner.get(*station).map(String::as_str) == Some(owner))
            .map(|(_, timeline)| timeline)
            .collect()
    }

    /// Owner of `station`.
    #[must_use]
    pub fn owner_of(&self, station: &str) -> Option<&str> {
        self.station_owner.get(station).map(String::as_str)
    }

    /// Owners with at least one observed station.
    #[must_use]
    pub fn owners(&self) -> Vec<OwnerId> {
        self.owners.keys().cloned().collect()
    }

    /// Iterate `(station, timeline)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&StationId, &ProductionTimeline)> {
        self.timelines.iter()
    }

    /// Number of timelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    /// Whether no timelines exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    /// Persist every timeline and the station index, dropping records of removed stations.
    pub fn save(&self, store: &mut dyn DurableStore) -> Result<(), SchedulerError> {
        for key in store.keys_with_prefix(TIMELINE_KEY_PREFIX) {
            let station = key.strip_prefix(TIMELINE_KEY_PREFIX).unwrap_or(&key);
            if !self.timelines.contains_key(station) {
                store.delete(&key)?;
            }
        }
        for (station, timeline) in &self.timelines {
            save_typed(store, &timeline_key(station), &timeline.to_record())?;
        }
        let index = RegistryIndex {
            owners: self.owners.clone(),
        };
        save_typed(store, REGISTRY_KEY, &index)
    }

    /// Restore from the store. Unreadable or inconsistent records come back as
    /// fresh timelines; their bookings are lost and get rebuilt from the queue.
    pub fn load(config: TimelineConfig, store: &dyn DurableStore) -> Result<Self, SchedulerError> {
        let mut registry = Self::new(config);
        let index: RegistryIndex = load_typed(store, REGISTRY_KEY)?.unwrap_or_default();

        for (owner, stations) in index.owners {
            for station in &stations {
                registry
                    .station_owner
                    .insert(station.clone(), owner.clone());
                let record: Result<Option<TimelineRecord>, _> =
                    load_typed(store, &timeline_key(station));
                let timeline = match record {
                    Ok(Some(record)) => {
                        ProductionTimeline::from_record(station.as_str(), &registry.config, record)
                    }
                    Ok(None) => Ok(ProductionTimeline::new(station.as_str(), &registry.config)),
                    Err(err) => Err(err),
                };
                let timeline = timeline.unwrap_or_else(|err| {
                    warn!(station = %station, error = %err, "discarding unreadable timeline");
                    ProductionTimeline::new(station.as_str(), &registry.config)
                });
                registry.timelines.insert(station.clone(), timeline);
            }
            registry.owners.insert(owner, stations);
        }
        Ok(registry)
    }
}
