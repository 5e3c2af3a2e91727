//! Shared store driven by a background flush task
//!
//! `SharedMatrixStore` puts a `MatrixStore` behind an async mutex and spawns
//! one task that flushes it when the debounce window elapses. Callers mutate
//! through `update` and never poll: every update that leaves a flush
//! scheduled wakes the task, which sleeps until the current deadline and
//! re-reads it whenever it is woken again. Subscribers therefore receive
//! their events without any further call on the store.
//!
//! The task ends when the last handle is dropped.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::sync::Arc;

use log::{debug, trace};
use tokio::sync::{broadcast, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::sleep_until;

use crate::matrix::MatrixState;
use crate::reactive::UpdateEvent;
use crate::store::MatrixStore;

/// Aborts the flush task once no handle refers to it
#[derive(Debug)]
struct FlushTask {
    handle: JoinHandle<()>,
}

impl Drop for FlushTask {
    fn drop(&mut self) {
        debug!("Stopping background flush task");
        self.handle.abort();
    }
}

/// Cloneable handle to a store flushed in the background
#[derive(Debug, Clone)]
pub struct SharedMatrixStore {
    store: Arc<Mutex<MatrixStore>>,

    /// Wakes the flush task after a mutation scheduled a flush
    wake: Arc<Notify>,

    _flush_task: Arc<FlushTask>,
}

impl SharedMatrixStore {
    /// Take ownership of `store` and start its flush task on the current
    /// tokio runtime.
    pub fn spawn(store: MatrixStore) -> Self {
        let store = Arc::new(Mutex::new(store));
        let wake = Arc::new(Notify::new());
        let handle = tokio::spawn(flush_loop(Arc::clone(&store), Arc::clone(&wake)));
        Self {
            store,
            wake,
            _flush_task: Arc::new(FlushTask { handle }),
        }
    }

    /// Run `mutate` against the store and hand any scheduled flush to the
    /// background task.
    pub async fn update<F, R>(&self, mutate: F) -> R
    where
        F: FnOnce(&mut MatrixStore) -> R,
    {
        let mut store = self.store.lock().await;
        let result = mutate(&mut store);
        if store.flush_deadline().is_some() {
            self.wake.notify_one();
        }
        result
    }

    /// Run `inspect` against the store without mutating it
    pub async fn read<F, R>(&self, inspect: F) -> R
    where
        F: FnOnce(&MatrixStore) -> R,
    {
        inspect(&*self.store.lock().await)
    }

    pub async fn snapshot(&self) -> Arc<MatrixState> {
        self.store.lock().await.snapshot()
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.store.lock().await.subscribe()
    }
}

/// Sleep until the scheduled deadline, flush, repeat. A wake-up restarts
/// the wait so a deadline pushed back by a later mutation is honored.
async fn flush_loop(store: Arc<Mutex<MatrixStore>>, wake: Arc<Notify>) {
    loop {
        let deadline = store.lock().await.flush_deadline();
        match deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = sleep_until(deadline) => {
                        if let Some(report) = store.lock().await.poll() {
                            trace!("Background flush fired {:?}", report.kinds());
                        }
                    }
                    _ = wake.notified() => {}
                }
            }
            None => wake.notified().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::UpdateKind;
    use std::time::Duration;
    use tokio::time::Instant;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn data() -> Vec<Vec<f64>> {
        vec![vec![5.0, 7.0, 13.0, 1.0], vec![0.0, 11.0, 2.0]]
    }

    /// Event kinds up to and including the aggregate `updated`
    async fn next_flush(receiver: &mut broadcast::Receiver<UpdateEvent>) -> Vec<UpdateKind> {
        let mut kinds = Vec::new();
        loop {
            let event = receiver.recv().await.unwrap();
            kinds.push(event.kind);
            if event.kind == UpdateKind::Any {
                return kinds;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscriber_notified_without_polling() {
        init_logging();
        let shared = SharedMatrixStore::spawn(MatrixStore::new());
        let mut receiver = shared.subscribe().await;
        let start = Instant::now();

        shared
            .update(|store| {
                store.import_matrix(&data(), Some(3), Some(5));
            })
            .await;

        let kinds = next_flush(&mut receiver).await;
        assert_eq!(kinds.first(), Some(&UpdateKind::Data));
        assert_eq!(kinds.len(), 7);
        assert!(start.elapsed() >= Duration::from_millis(10));
        assert_eq!(shared.snapshot().await.row_dims(), 3);

        shared
            .update(|store| {
                store.select_row(1, None);
            })
            .await;
        let kinds = next_flush(&mut receiver).await;
        assert!(kinds.contains(&UpdateKind::Selection));
        assert_eq!(shared.snapshot().await.rows().selected_indexes(), &[1]);
        assert!(!shared.read(|store| store.has_pending()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_from_clones_flushes_once() {
        init_logging();
        let shared = SharedMatrixStore::spawn(MatrixStore::new());
        let other = shared.clone();
        let mut receiver = shared.subscribe().await;

        shared
            .update(|store| {
                store.import_matrix(&data(), Some(3), Some(5));
            })
            .await;
        tokio::time::advance(Duration::from_millis(6)).await;
        other
            .update(|store| {
                store.show_columns(&[1, 2]);
            })
            .await;

        let kinds = next_flush(&mut receiver).await;
        assert_eq!(kinds.first(), Some(&UpdateKind::Data));
        assert_eq!(kinds.iter().filter(|&&kind| kind == UpdateKind::Any).count(), 1);
        assert_eq!(other.snapshot().await.columns().visible_indexes(), &[1, 2]);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_task_stops_with_last_handle() {
        init_logging();
        let shared = SharedMatrixStore::spawn(MatrixStore::new());
        let other = shared.clone();
        let store = Arc::downgrade(&shared.store);
        drop(shared);
        tokio::task::yield_now().await;
        assert!(store.upgrade().is_some());

        drop(other);
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert!(store.upgrade().is_none());
    }
}
