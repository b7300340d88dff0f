//! Optimistic State Controller
//!
//! Owns the house collection and runs single-record mutations as
//! apply-then-confirm: the local change is visible before the request
//! resolves and is rolled back if the request fails.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::RemoteStore;
use crate::error::ApiResult;
use crate::models::{House, NewHouse};
use crate::notify::{Notifier, Timer, Toast};
use crate::state::{HouseSnapshot, HouseState, LoadState};

pub const MSG_CANDY_FILLED: &str = "Candy filled";
pub const MSG_CANDY_EMPTIED: &str = "Candy emptied";
pub const MSG_CANDY_FAILED: &str = "Failed to update candy";
pub const MSG_HOUSE_ADDED: &str = "House added successfully!";
pub const MSG_HOUSE_FAILED: &str = "Failed to add house";

pub type SnapshotListener = Rc<dyn Fn(&HouseSnapshot)>;

/// Result of a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Applied locally and confirmed by the server
    Applied,
    /// Dropped: the record already has a mutation in flight, or is unknown
    Skipped,
}

pub(crate) struct Shared<S, T: Timer> {
    pub(crate) store: S,
    pub(crate) state: RefCell<HouseState>,
    pub(crate) notifier: Notifier<T>,
    listeners: RefCell<Vec<SnapshotListener>>,
}

/// Cheap to clone; clones drive the same collection
pub struct HouseController<S, T: Timer> {
    pub(crate) shared: Rc<Shared<S, T>>,
}

impl<S, T: Timer> Clone for HouseController<S, T> {
    fn clone(&self) -> Self {
        Self { shared: Rc::clone(&self.shared) }
    }
}

impl<S: RemoteStore, T: Timer> HouseController<S, T> {
    pub fn new(store: S, notifier: Notifier<T>) -> Self {
        Self {
            shared: Rc::new(Shared {
                store,
                state: RefCell::new(HouseState::new()),
                notifier,
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.shared.store
    }

    pub fn notifier(&self) -> &Notifier<T> {
        &self.shared.notifier
    }

    pub fn houses(&self) -> Vec<House> {
        self.shared.state.borrow().houses().to_vec()
    }

    pub fn house(&self, id: u32) -> Option<House> {
        self.shared.state.borrow().house(id).cloned()
    }

    pub fn is_pending(&self, id: u32) -> bool {
        self.shared.state.borrow().is_pending(id)
    }

    pub fn load_state(&self) -> LoadState {
        self.shared.state.borrow().load().clone()
    }

    pub fn snapshot(&self) -> HouseSnapshot {
        self.shared.state.borrow().snapshot()
    }

    pub fn toast(&self) -> Option<Toast> {
        self.shared.notifier.current()
    }

    /// Called with a fresh snapshot after every state change
    pub fn subscribe(&self, listener: impl Fn(&HouseSnapshot) + 'static) {
        self.shared.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub(crate) fn publish(&self) {
        let snapshot = self.snapshot();
        let listeners = self.shared.listeners.borrow().clone();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    /// Replace the collection with the server's
    pub async fn reload(&self) -> ApiResult<()> {
        let ticket = self.shared.state.borrow_mut().begin_reload();
        self.publish();

        let result = self.shared.store.list().await;
        let outcome = match result {
            Ok(houses) => {
                let count = houses.len();
                let applied = self.shared.state.borrow_mut().finish_reload(ticket, houses);
                if applied {
                    log::info!("[HOUSES] Loaded {} houses", count);
                } else {
                    log::debug!("[HOUSES] Dropped stale reload of {} houses", count);
                }
                Ok(())
            }
            Err(e) => {
                log::error!("[HOUSES] Reload failed: {}", e);
                self.shared.state.borrow_mut().fail_reload(ticket, e.to_string());
                Err(e)
            }
        };
        self.publish();
        outcome
    }

    /// Set `candy_in_stock` optimistically, reverting if the server refuses
    pub async fn toggle_candy(&self, id: u32, value: bool) -> ApiResult<ToggleOutcome> {
        let write = self.shared.state.borrow_mut().begin_toggle(id, value);
        let Some(write) = write else {
            log::debug!("[HOUSES] Toggle for house {} skipped", id);
            return Ok(ToggleOutcome::Skipped);
        };
        self.publish();

        match self.shared.store.patch(id, value).await {
            Ok(()) => {
                self.shared.state.borrow_mut().confirm(&write);
                self.publish();
                self.shared
                    .notifier
                    .success(if value { MSG_CANDY_FILLED } else { MSG_CANDY_EMPTIED });
                Ok(ToggleOutcome::Applied)
            }
            Err(e) => {
                let restored = self.shared.state.borrow_mut().revert(&write);
                log::warn!(
                    "[HOUSES] Patch for house {} failed, {}: {}",
                    id,
                    if restored { "reverted" } else { "superseded" },
                    e
                );
                self.publish();
                self.shared.notifier.error(MSG_CANDY_FAILED);
                Err(e)
            }
        }
    }

    /// Create a house and reload to learn its id
    pub async fn add_house(&self, house: NewHouse) -> ApiResult<()> {
        if let Err(e) = self.shared.store.create(&house).await {
            log::warn!("[HOUSES] Create {:?} failed: {}", house.name(), e);
            self.shared.notifier.error(MSG_HOUSE_FAILED);
            return Err(e);
        }

        // Failure shows up in the load state; the house itself was created
        if let Err(e) = self.reload().await {
            log::warn!("[HOUSES] Reload after create failed: {}", e);
        }
        self.shared.notifier.success(MSG_HOUSE_ADDED);
        Ok(())
    }
}
