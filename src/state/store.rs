use crate::models::{Location, Machine, Stats};

use super::filters::{FilterPatch, Filters};
use super::query::LocationQuery;

/// Owns all shared viewer state. Every mutation goes through a transition
/// method here; the views only ever read a snapshot.
///
/// Each query key (locations, machines, stats) carries a monotonically
/// increasing sequence number. A response is applied only while its
/// sequence is still the latest issued for that key, so a slow superseded
/// request can never overwrite a fresher result.
pub struct Store {
    pub locations: Vec<Location>,
    pub machines: Vec<Machine>,
    pub stats: Option<Stats>,
    pub selected_machine: String,
    pub selected_location: Option<Location>,
    pub filters: Filters,
    pub loading: bool,
    pub error: Option<String>,

    locations_seq: u64,
    machines_seq: u64,
    stats_seq: u64,
}

impl Store {
    pub fn new() -> Self {
        Self {
            locations: Vec::new(),
            machines: Vec::new(),
            stats: None,
            selected_machine: String::new(),
            selected_location: None,
            filters: Filters::default(),
            loading: false,
            error: None,
            locations_seq: 0,
            machines_seq: 0,
            stats_seq: 0,
        }
    }

    /// Select a machine (empty string = all machines). Always clears the
    /// selected location; the old point may not belong to the new set.
    /// Returns whether the selection changed and a reload is due.
    pub fn select_machine(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        self.selected_location = None;
        if self.selected_machine == name {
            return false;
        }
        self.selected_machine = name;
        true
    }

    pub fn select_location(&mut self, location: Location) {
        self.selected_location = Some(location);
    }

    /// Shallow-merge a filter patch. Returns whether a reload is due.
    pub fn apply_filters(&mut self, patch: FilterPatch) -> bool {
        self.filters.apply(patch)
    }

    /// Start a location load for the current selection and filters
    pub fn begin_location_load(&mut self) -> (u64, LocationQuery) {
        self.locations_seq += 1;
        self.loading = true;
        self.error = None;
        (
            self.locations_seq,
            LocationQuery::for_selection(&self.selected_machine, &self.filters),
        )
    }

    /// Apply a finished location load. Stale responses are dropped
    /// silently; failures keep the previous working set.
    pub fn finish_location_load(&mut self, seq: u64, result: Result<Vec<Location>, String>) {
        if seq != self.locations_seq {
            return;
        }
        self.loading = false;
        match result {
            Ok(locations) => self.locations = locations,
            Err(message) => self.error = Some(message),
        }
    }

    pub fn begin_machines_load(&mut self) -> u64 {
        self.machines_seq += 1;
        self.machines_seq
    }

    pub fn finish_machines_load(&mut self, seq: u64, result: Result<Vec<Machine>, String>) {
        if seq != self.machines_seq {
            return;
        }
        match result {
            Ok(machines) => self.machines = machines,
            Err(message) => self.error = Some(message),
        }
    }

    pub fn begin_stats_load(&mut self) -> u64 {
        self.stats_seq += 1;
        self.stats_seq
    }

    pub fn finish_stats_load(&mut self, seq: u64, result: Result<Stats, String>) {
        if seq != self.stats_seq {
            return;
        }
        match result {
            Ok(stats) => self.stats = Some(stats),
            Err(message) => self.error = Some(message),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(id: i64, machine: &str) -> Location {
        Location {
            id,
            machine_name: machine.to_string(),
            user_name: None,
            latitude: -12.0,
            longitude: -77.0,
            accuracy: None,
            location_source: None,
            city: None,
            country: None,
            public_ip: None,
            created_at: Some("2024-03-04T10:30:00Z".to_string()),
            timestamp: None,
        }
    }

    #[test]
    fn selecting_a_machine_clears_the_selected_location() {
        let mut store = Store::new();
        store.select_location(location(1, "LAPTOP-1"));
        assert!(store.selected_location.is_some());

        assert!(store.select_machine("LAPTOP-2"));
        assert!(store.selected_location.is_none());
        assert_eq!(store.selected_machine, "LAPTOP-2");

        // Re-selecting the same machine still clears, but needs no reload
        store.select_location(location(2, "LAPTOP-2"));
        assert!(!store.select_machine("LAPTOP-2"));
        assert!(store.selected_location.is_none());
    }

    #[test]
    fn clearing_the_selection_reissues_an_unscoped_query() {
        let mut store = Store::new();
        store.select_machine("LAPTOP-1");
        let (_, query) = store.begin_location_load();
        assert_eq!(
            query,
            LocationQuery::Machine {
                name: "LAPTOP-1".to_string(),
                limit: 100,
                hours: 24,
            }
        );

        assert!(store.select_machine(""));
        let (_, query) = store.begin_location_load();
        assert_eq!(query, LocationQuery::All { limit: 100 });
    }

    #[test]
    fn failed_load_keeps_previous_locations() {
        let mut store = Store::new();
        let (seq, _) = store.begin_location_load();
        store.finish_location_load(seq, Ok(vec![location(1, "LAPTOP-1")]));
        assert_eq!(store.locations.len(), 1);

        let (seq, _) = store.begin_location_load();
        assert!(store.loading);
        assert!(store.error.is_none());
        store.finish_location_load(seq, Err("Network error: timed out".to_string()));

        assert_eq!(store.locations.len(), 1);
        assert_eq!(store.error.as_deref(), Some("Network error: timed out"));
        assert!(!store.loading);
    }

    #[test]
    fn stale_response_never_overwrites_a_newer_one() {
        let mut store = Store::new();
        let (old_seq, _) = store.begin_location_load();
        let (new_seq, _) = store.begin_location_load();

        store.finish_location_load(new_seq, Ok(vec![location(2, "LAPTOP-2")]));
        assert!(!store.loading);

        // The slow earlier response resolves afterwards and is dropped
        store.finish_location_load(old_seq, Ok(vec![location(1, "LAPTOP-1")]));
        assert_eq!(store.locations.len(), 1);
        assert_eq!(store.locations[0].id, 2);
    }

    #[test]
    fn stale_response_does_not_clear_loading_of_a_newer_request() {
        let mut store = Store::new();
        let (old_seq, _) = store.begin_location_load();
        let (_new_seq, _) = store.begin_location_load();

        store.finish_location_load(old_seq, Ok(vec![]));
        assert!(store.loading);
    }

    #[test]
    fn machine_and_stats_slots_update_independently() {
        let mut store = Store::new();
        let machines_seq = store.begin_machines_load();
        let stats_seq = store.begin_stats_load();

        store.finish_machines_load(machines_seq, Err("machines unavailable".to_string()));
        store.finish_stats_load(
            stats_seq,
            Ok(Stats {
                total_locations: 10,
                unique_machines: 2,
            }),
        );

        // One slot failed, the other still populated
        assert!(store.machines.is_empty());
        assert_eq!(store.stats.as_ref().unwrap().total_locations, 10);
        assert_eq!(store.error.as_deref(), Some("machines unavailable"));
    }

    #[test]
    fn filter_change_is_reported_for_reload() {
        let mut store = Store::new();
        assert!(!store.apply_filters(FilterPatch::default()));
        assert!(store.apply_filters(FilterPatch {
            limit: None,
            hours: Some(48),
        }));
        let (_, query) = store.begin_location_load();
        assert_eq!(query, LocationQuery::All { limit: 100 });

        store.select_machine("LAPTOP-1");
        let (_, query) = store.begin_location_load();
        assert_eq!(
            query,
            LocationQuery::Machine {
                name: "LAPTOP-1".to_string(),
                limit: 100,
                hours: 48,
            }
        );
    }
}
