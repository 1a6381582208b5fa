//! Fire-and-forget dispatch of sync work.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, Notify};

use crate::sync::orchestrator::{SyncOrchestrator, SyncRequest};

/// Upper bound on queued sync requests. Far above anything a low-volume
/// admin tool produces; hitting it means the secondary store has been down
/// long enough that dropping work is the right call.
const SYNC_QUEUE_CAPACITY: usize = 256;

/// Handle for submitting sync work without awaiting it.
///
/// Requests drain through a single worker task in FIFO order, so two
/// mutations of the same row are always propagated in the order they were
/// dispatched — a delayed create can never resurrect a record a later
/// delete already removed.
#[derive(Clone)]
pub struct SyncDispatcher {
    tx: mpsc::Sender<SyncRequest>,
    in_flight: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl SyncDispatcher {
    /// Enqueues a request and returns immediately.
    ///
    /// Never errors the caller: the primary write has already succeeded and
    /// its HTTP response must not depend on this. A full queue drops the
    /// request with an error log; the row self-heals on its next update or
    /// via force-resync.
    pub fn dispatch(&self, request: SyncRequest) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if let Err(err) = self.tx.try_send(request) {
            error!("sync queue full, dropping request: {}", err);
            self.finish_one();
        }
    }

    /// Waits until every dispatched request has been processed.
    ///
    /// Deterministic completion hook for tests and shutdown; production
    /// callers never await sync completion.
    pub async fn wait_idle(&self) {
        loop {
            if self.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            let notified = self.idle.notified();
            // Re-check after registering to close the wakeup race.
            if self.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    fn finish_one(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Spawns the background worker that owns the orchestrator and processes
/// requests one at a time.
///
/// Each attempt runs to completion or failure; there is no cancellation
/// beyond the adapter's own network timeout. Failures have already been
/// recorded in the sync ledger by the orchestrator, so the worker only logs.
pub fn spawn_sync_worker(orchestrator: Arc<SyncOrchestrator>) -> SyncDispatcher {
    let (tx, mut rx) = mpsc::channel::<SyncRequest>(SYNC_QUEUE_CAPACITY);
    let in_flight = Arc::new(AtomicUsize::new(0));
    let idle = Arc::new(Notify::new());

    let dispatcher = SyncDispatcher {
        tx,
        in_flight: in_flight.clone(),
        idle: idle.clone(),
    };

    tokio::spawn(async move {
        info!("sync worker started");
        while let Some(request) = rx.recv().await {
            let kind = request.kind;
            let id = request.snapshot.id;
            let action = request.action;
            match orchestrator.sync_entity(request).await {
                Ok(Some(secondary_id)) => {
                    debug!("synced {} {} -> {}", kind, id, secondary_id)
                }
                Ok(None) => debug!("removed {} {} from secondary store", kind, id),
                Err(err) => warn!("sync of {} {} ({}) failed: {}", kind, id, action, err),
            }
            if in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                idle.notify_waiters();
            }
        }
        info!("sync worker shutting down");
    });

    dispatcher
}
