use metrics::{counter, gauge};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Undelivered messages a viewer may hold before it is treated as dead.
pub const VIEWER_OUTBOX_CAPACITY: usize = 16;

pub type ViewerId = u64;

/// A registered viewer's end of the hub: its id and the outbox the hub fills.
#[derive(Debug)]
pub struct ViewerHandle {
    pub id: ViewerId,
    pub outbox: mpsc::Receiver<Arc<str>>,
}

/// Result of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub pruned: usize,
}

/// Set of connected viewers. Cloning shares the same set.
///
/// `broadcast` never awaits: each viewer has its own bounded outbox, and a
/// closed or full outbox removes that viewer without touching the others.
#[derive(Debug, Clone, Default)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

#[derive(Debug, Default)]
struct HubInner {
    viewers: Mutex<HashMap<ViewerId, mpsc::Sender<Arc<str>>>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn viewers(&self) -> MutexGuard<'_, HashMap<ViewerId, mpsc::Sender<Arc<str>>>> {
        self.inner
            .viewers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self) -> ViewerHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(VIEWER_OUTBOX_CAPACITY);

        let count = {
            let mut viewers = self.viewers();
            viewers.insert(id, tx);
            viewers.len()
        };
        gauge!("viewers_connected").set(count as f64);
        tracing::info!(viewer = id, viewers = count, "Viewer connected");

        ViewerHandle { id, outbox: rx }
    }

    /// Remove a viewer. Returns false if it was already gone.
    pub fn unregister(&self, id: ViewerId) -> bool {
        let (removed, count) = {
            let mut viewers = self.viewers();
            let removed = viewers.remove(&id).is_some();
            (removed, viewers.len())
        };
        if removed {
            gauge!("viewers_connected").set(count as f64);
            tracing::info!(viewer = id, viewers = count, "Viewer disconnected");
        }
        removed
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers().len()
    }

    /// Serialise `payload` once and offer it to every viewer.
    pub fn broadcast<T: Serialize>(&self, payload: &T) -> Result<BroadcastReport, serde_json::Error> {
        let message: Arc<str> = serde_json::to_string(payload)?.into();
        Ok(self.broadcast_text(message))
    }

    pub fn broadcast_text(&self, message: Arc<str>) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        let count = {
            let mut viewers = self.viewers();
            viewers.retain(|id, outbox| match outbox.try_send(message.clone()) {
                Ok(()) => {
                    report.delivered += 1;
                    true
                }
                Err(e) => {
                    tracing::warn!(viewer = *id, error = %e, "Dropping viewer after failed send");
                    report.pruned += 1;
                    false
                }
            });
            viewers.len()
        };

        counter!("broadcasts_total").increment(1);
        if report.pruned > 0 {
            counter!("viewers_pruned_total").increment(report.pruned as u64);
            gauge!("viewers_connected").set(count as f64);
        }

        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_broadcast_reaches_every_viewer() {
        let hub = BroadcastHub::new();
        let mut a = hub.register();
        let mut b = hub.register();

        let report = hub.broadcast(&json!({ "blocks": [] })).unwrap();
        assert_eq!(report, BroadcastReport { delivered: 2, pruned: 0 });

        assert_eq!(&*a.outbox.recv().await.unwrap(), r#"{"blocks":[]}"#);
        assert_eq!(&*b.outbox.recv().await.unwrap(), r#"{"blocks":[]}"#);
    }

    #[tokio::test]
    async fn test_dead_viewer_is_pruned_without_affecting_others() {
        let hub = BroadcastHub::new();
        let dead = hub.register();
        let mut alive = hub.register();
        drop(dead.outbox);

        let report = hub.broadcast(&json!({ "n": 1 })).unwrap();
        assert_eq!(report, BroadcastReport { delivered: 1, pruned: 1 });
        assert_eq!(hub.viewer_count(), 1);
        assert!(alive.outbox.recv().await.is_some());

        // already pruned: unregister is a no-op
        assert!(!hub.unregister(dead.id));
    }

    #[tokio::test]
    async fn test_stalled_viewer_is_pruned_once_outbox_fills() {
        let hub = BroadcastHub::new();
        let stalled = hub.register();

        for _ in 0..VIEWER_OUTBOX_CAPACITY {
            let report = hub.broadcast(&json!({})).unwrap();
            assert_eq!(report.delivered, 1);
        }
        let report = hub.broadcast(&json!({})).unwrap();
        assert_eq!(report, BroadcastReport { delivered: 0, pruned: 1 });
        assert_eq!(hub.viewer_count(), 0);

        drop(stalled);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let hub = BroadcastHub::new();
        let viewer = hub.register();
        let other = hub.register();
        assert_ne!(viewer.id, other.id);

        assert!(hub.unregister(viewer.id));
        assert!(!hub.unregister(viewer.id));
        assert_eq!(hub.viewer_count(), 1);
    }

    #[test]
    fn test_broadcast_with_no_viewers() {
        let hub = BroadcastHub::new();
        let report = hub.broadcast(&json!({ "blocks": [] })).unwrap();
        assert_eq!(report, BroadcastReport::default());
    }
}
