//! Bulk Operation Coordinator
//!
//! Fans one `candy_in_stock` value out to every house, then reloads. No
//! optimistic writes: the reload is what reconciles the collection, including
//! after partial failure. Houses are held pending while their patch is out,
//! and a house that already has a toggle in flight is skipped.

use futures::future::join_all;

use crate::api::RemoteStore;
use crate::controller::HouseController;
use crate::error::{ApiError, ApiResult};
use crate::notify::Timer;

pub const MSG_BULK_FAILED: &str = "Bulk update failed";

/// Per-record outcome of a bulk update
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkReport {
    pub target: bool,
    pub attempted: Vec<u32>,
    /// Had a mutation in flight when the bulk update started
    pub skipped: Vec<u32>,
    pub failed: Vec<(u32, ApiError)>,
}

impl BulkReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.attempted.len() - self.failed.len()
    }
}

fn starting_message(target: bool) -> &'static str {
    if target {
        "Filling all candy..."
    } else {
        "Emptying all candy..."
    }
}

fn done_message(target: bool) -> &'static str {
    if target {
        "All candy filled"
    } else {
        "All candy emptied"
    }
}

impl<S: RemoteStore, T: Timer> HouseController<S, T> {
    /// Patch every idle house concurrently, wait for all, then reload.
    ///
    /// Houses with a toggle in flight are skipped and listed in the report.
    /// The reload runs even when some patches failed. `Err` means the reload
    /// itself failed; patch failures are listed in the report.
    pub async fn bulk_set(&self, target: bool) -> ApiResult<BulkReport> {
        self.shared.notifier.info(starting_message(target));

        let (ids, skipped) = {
            let mut state = self.shared.state.borrow_mut();
            let ids = state.begin_bulk();
            let skipped: Vec<u32> = state
                .houses()
                .iter()
                .map(|h| h.id)
                .filter(|id| !ids.contains(id))
                .collect();
            (ids, skipped)
        };
        self.publish();
        log::info!("[BULK] Setting candy_in_stock={} on {} houses", target, ids.len());
        if !skipped.is_empty() {
            log::debug!("[BULK] Skipping houses with a toggle in flight: {:?}", skipped);
        }

        let store = &self.shared.store;
        let results = join_all(ids.iter().map(|&id| async move { (id, store.patch(id, target).await) })).await;
        // Pending records keep their local value through a reload
        self.shared.state.borrow_mut().end_bulk(&ids);

        let failed: Vec<(u32, ApiError)> = results
            .into_iter()
            .filter_map(|(id, result)| result.err().map(|e| (id, e)))
            .collect();
        for (id, error) in &failed {
            log::warn!("[BULK] Patch for house {} failed: {}", id, error);
        }
        let report = BulkReport { target, attempted: ids, skipped, failed };

        let reloaded = self.reload().await;
        if report.is_complete() && reloaded.is_ok() {
            self.shared.notifier.success(done_message(target));
        } else {
            self.shared.notifier.error(MSG_BULK_FAILED);
        }
        reloaded.map(|()| report)
    }
}
