//! House Collection State
//!
//! The in-memory collection plus the bookkeeping for optimistic writes.
//!
//! Every optimistic write and every reload start draws a stamp from one
//! counter. A finished reload replaces the collection except for records that
//! are still pending or were written after that reload started; those keep the
//! local `candy_in_stock`. A reload older than one already applied is dropped.

use std::collections::{BTreeSet, HashMap};

use crate::models::House;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Read-only copy handed to observers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HouseSnapshot {
    pub houses: Vec<House>,
    /// Ids with a mutation in flight, ascending
    pub pending: Vec<u32>,
    pub load: LoadState,
}

impl HouseSnapshot {
    pub fn is_pending(&self, id: u32) -> bool {
        self.pending.binary_search(&id).is_ok()
    }
}

/// An applied optimistic write, needed to confirm or revert it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticWrite {
    pub id: u32,
    pub previous: bool,
    pub value: bool,
    stamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadTicket {
    stamp: u64,
}

#[derive(Debug, Default)]
pub struct HouseState {
    houses: Vec<House>,
    pending: BTreeSet<u32>,
    load: LoadState,
    clock: u64,
    /// id -> stamp of the latest optimistic write a reload has not yet covered
    local_writes: HashMap<u32, u64>,
    applied_reload: u64,
    reloads_in_flight: usize,
}

impl HouseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    pub fn house(&self, id: u32) -> Option<&House> {
        self.houses.iter().find(|h| h.id == id)
    }

    pub fn is_pending(&self, id: u32) -> bool {
        self.pending.contains(&id)
    }

    pub fn load(&self) -> &LoadState {
        &self.load
    }

    pub fn snapshot(&self) -> HouseSnapshot {
        HouseSnapshot {
            houses: self.houses.clone(),
            pending: self.pending.iter().copied().collect(),
            load: self.load.clone(),
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn house_mut(&mut self, id: u32) -> Option<&mut House> {
        self.houses.iter_mut().find(|h| h.id == id)
    }

    // ========================
    // Optimistic Writes
    // ========================

    /// Mark `id` pending and apply `value` locally.
    ///
    /// Returns `None` when `id` is already pending or not in the collection.
    pub fn begin_toggle(&mut self, id: u32, value: bool) -> Option<OptimisticWrite> {
        if self.pending.contains(&id) {
            return None;
        }
        let house = self.house_mut(id)?;
        let previous = house.candy_in_stock;
        house.candy_in_stock = value;

        let stamp = self.tick();
        self.pending.insert(id);
        self.local_writes.insert(id, stamp);
        Some(OptimisticWrite { id, previous, value, stamp })
    }

    /// The server accepted the write; keep the local value
    pub fn confirm(&mut self, write: &OptimisticWrite) {
        self.pending.remove(&write.id);
    }

    /// The server rejected the write; restore the previous value.
    ///
    /// Returns false when a later local write owns the record, in which case
    /// nothing is restored.
    pub fn revert(&mut self, write: &OptimisticWrite) -> bool {
        self.pending.remove(&write.id);
        if self.local_writes.get(&write.id) != Some(&write.stamp) {
            return false;
        }
        self.local_writes.remove(&write.id);
        if let Some(house) = self.house_mut(write.id) {
            house.candy_in_stock = write.previous;
        }
        true
    }

    /// Mark every record without a mutation in flight pending.
    ///
    /// Returns the ids marked; records already pending are left to their own
    /// request. Nothing is written locally.
    pub fn begin_bulk(&mut self) -> Vec<u32> {
        let ids: Vec<u32> = self
            .houses
            .iter()
            .map(|h| h.id)
            .filter(|id| !self.pending.contains(id))
            .collect();
        self.pending.extend(ids.iter().copied());
        ids
    }

    /// Release the ids taken by `begin_bulk`, before the reconciling reload
    pub fn end_bulk(&mut self, ids: &[u32]) {
        for id in ids {
            self.pending.remove(id);
        }
    }

    // ========================
    // Reloads
    // ========================

    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.reloads_in_flight += 1;
        self.load = LoadState::Loading;
        ReloadTicket { stamp: self.tick() }
    }

    /// Replace the collection with a fetched one.
    ///
    /// Returns false when a newer reload has already been applied.
    pub fn finish_reload(&mut self, ticket: ReloadTicket, mut fetched: Vec<House>) -> bool {
        self.reloads_in_flight = self.reloads_in_flight.saturating_sub(1);
        if ticket.stamp < self.applied_reload {
            self.settle_load_state();
            return false;
        }

        for house in fetched.iter_mut() {
            let written_later = self
                .local_writes
                .get(&house.id)
                .is_some_and(|stamp| *stamp > ticket.stamp);
            if written_later || self.pending.contains(&house.id) {
                if let Some(local) = self.house(house.id) {
                    house.candy_in_stock = local.candy_in_stock;
                }
            }
        }

        let pending = &self.pending;
        self.local_writes
            .retain(|id, stamp| *stamp > ticket.stamp || pending.contains(id));
        self.houses = fetched;
        self.applied_reload = ticket.stamp;
        self.load = LoadState::Loaded;
        self.settle_load_state();
        true
    }

    pub fn fail_reload(&mut self, ticket: ReloadTicket, message: String) {
        self.reloads_in_flight = self.reloads_in_flight.saturating_sub(1);
        if ticket.stamp > self.applied_reload {
            self.load = LoadState::Failed(message);
        }
        self.settle_load_state();
    }

    fn settle_load_state(&mut self) {
        if self.reloads_in_flight > 0 {
            self.load = LoadState::Loading;
        } else if self.load == LoadState::Loading {
            self.load = LoadState::Loaded;
        }
    }
}
