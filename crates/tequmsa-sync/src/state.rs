//! Shared relay state: bounded update log, broadcast fan-out, the engine

use crate::auth::ResolvedAuth;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tequmsa_core::UpdateEnvelope;
use tequmsa_engine::TequmsaEngine;
use tokio::sync::{broadcast, Mutex, RwLock};
use uuid::Uuid;

/// Capacity of the websocket broadcast channel.
const BROADCAST_CAPACITY: usize = 256;

/// Accepted updates, oldest first, capped at `capacity`.
#[derive(Debug)]
pub struct UpdateLog {
    entries: VecDeque<UpdateEnvelope>,
    capacity: usize,
}

impl UpdateLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, envelope: UpdateEnvelope) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(envelope);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Payloads after `since`. An id no longer retained (or never seen)
    /// yields the whole log so a lagging client can resync.
    pub fn payloads_since(&self, since: Option<Uuid>) -> Vec<Value> {
        let start = since
            .and_then(|id| self.entries.iter().position(|e| e.id == id))
            .map(|pos| pos + 1)
            .unwrap_or(0);
        self.entries
            .iter()
            .skip(start)
            .map(|e| e.payload.clone())
            .collect()
    }
}

pub struct RelayState {
    pub auth: ResolvedAuth,
    pub engine: Arc<RwLock<TequmsaEngine>>,
    pub updates: Mutex<UpdateLog>,
    /// Every accepted update, fanned out to websocket subscribers.
    pub updates_tx: broadcast::Sender<UpdateEnvelope>,
    pub started_at: DateTime<Utc>,
}

impl RelayState {
    pub fn new(auth: ResolvedAuth, engine: Arc<RwLock<TequmsaEngine>>, max_updates: usize) -> Self {
        let (updates_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            auth,
            engine,
            updates: Mutex::new(UpdateLog::new(max_updates)),
            updates_tx,
            started_at: Utc::now(),
        }
    }

    /// Store `payload` and notify subscribers. Returns the assigned id.
    ///
    /// The broadcast happens under the log lock so subscribers see updates in
    /// log order.
    pub async fn dispatch(&self, payload: Value) -> Uuid {
        let envelope = UpdateEnvelope::new(payload);
        let id = envelope.id;
        let mut log = self.updates.lock().await;
        log.push(envelope.clone());
        // no subscribers is fine
        let _ = self.updates_tx.send(envelope);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn log_with(n: usize, capacity: usize) -> (UpdateLog, Vec<Uuid>) {
        let mut log = UpdateLog::new(capacity);
        let mut ids = Vec::new();
        for i in 0..n {
            let env = UpdateEnvelope::new(json!({ "seq": i }));
            ids.push(env.id);
            log.push(env);
        }
        (log, ids)
    }

    #[test]
    fn retention_drops_oldest() {
        let (log, _) = log_with(5, 3);
        assert_eq!(log.len(), 3);
        let payloads = log.payloads_since(None);
        assert_eq!(payloads[0]["seq"], 2);
        assert_eq!(payloads[2]["seq"], 4);
    }

    #[test]
    fn since_returns_later_updates() {
        let (log, ids) = log_with(4, 10);
        let payloads = log.payloads_since(Some(ids[1]));
        assert_eq!(payloads, vec![json!({"seq": 2}), json!({"seq": 3})]);
        assert!(log.payloads_since(Some(ids[3])).is_empty());
    }

    #[test]
    fn unknown_since_resyncs_everything() {
        let (log, _) = log_with(2, 10);
        assert_eq!(log.payloads_since(Some(Uuid::new_v4())).len(), 2);
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let (log, _) = log_with(3, 0);
        assert_eq!(log.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_dispatch_broadcasts_in_log_order() {
        let engine = Arc::new(RwLock::new(TequmsaEngine::default()));
        let state = Arc::new(RelayState::new(ResolvedAuth::open(), engine, 1024));
        let mut rx = state.updates_tx.subscribe();

        let tasks: Vec<_> = (0..4)
            .map(|task| {
                let state = state.clone();
                tokio::spawn(async move {
                    for seq in 0..40 {
                        state.dispatch(json!({ "task": task, "seq": seq })).await;
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let mut received = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            received.push(envelope.payload);
        }
        let logged = state.updates.lock().await.payloads_since(None);
        assert_eq!(logged.len(), 160);
        assert_eq!(received, logged);
    }
}
