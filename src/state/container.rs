//! The state container behind a mounted provider.

use crate::error::{Result, StateError};
use crate::state::operations::{as_object, shallow_merge, touched_keys};
use crate::subscriptions::{
    StateEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
use crate::types::{AppState, Revision};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// A shared application state container.
///
/// Holds exactly one `AppState` value at a time. The only mutation is
/// `update`, which shallow-merges a partial object into the current state
/// and notifies every subscriber before returning.
///
/// # Example
///
/// ```
/// use appstate::StateContainer;
/// use serde_json::json;
///
/// let container = StateContainer::new(json!({"count": 0})).unwrap();
/// container.update(json!({"count": 1})).unwrap();
/// assert_eq!(container.snapshot()["count"], 1);
/// ```
pub struct StateContainer {
    /// Current state.
    state: RwLock<AppState>,

    /// Revision of the current state.
    revision: RwLock<Revision>,

    /// Lock serializing merge + notify, so updates apply strictly in
    /// call order and no subscriber sees events out of order.
    write_lock: Mutex<()>,

    /// Subscription manager.
    subscriptions: SubscriptionManager,
}

impl std::fmt::Debug for StateContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateContainer").finish_non_exhaustive()
    }
}

impl StateContainer {
    /// Create a container seeded with `initial` state.
    ///
    /// The initial state must be a JSON object; anything else is a
    /// configuration error.
    pub fn new(initial: Value) -> Result<Self> {
        let state = as_object(initial, StateError::InvalidState)?;
        Ok(Self {
            state: RwLock::new(state),
            revision: RwLock::new(Revision(0)),
            write_lock: Mutex::new(()),
            subscriptions: SubscriptionManager::new(),
        })
    }

    /// Get a snapshot of the current state.
    pub fn snapshot(&self) -> Value {
        Value::Object(self.state.read().clone())
    }

    /// Get a typed snapshot of the current state.
    ///
    /// `T` is a decoding convenience only; the container performs no
    /// runtime validation of the state's shape beyond deserialization.
    pub fn read<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.snapshot())
            .map_err(|e| StateError::Deserialization(e.to_string()))
    }

    /// Revision of the current state.
    pub fn revision(&self) -> Revision {
        *self.revision.read()
    }

    /// Shallow-merge a partial update into the current state.
    ///
    /// Top-level keys present in `partial` replace their values wholesale;
    /// all other keys are preserved untouched. Every subscriber receives
    /// an `Updated` event before this returns, so the merge is observable
    /// by the next read.
    pub fn update(&self, partial: Value) -> Result<Revision> {
        let partial = as_object(partial, StateError::InvalidPartial)?;
        let changed = touched_keys(&partial);

        let _write = self.write_lock.lock();

        let merged = {
            let current = self.state.read();
            shallow_merge(&current, &partial)
        };

        let revision = {
            let mut state = self.state.write();
            let mut rev = self.revision.write();
            *state = merged;
            *rev = rev.next();
            *rev
        };

        debug!(revision = revision.0, keys = changed.len(), "applied update");

        self.subscriptions.broadcast(StateEvent::Updated {
            data: self.snapshot(),
            revision,
            changed,
        });

        Ok(revision)
    }

    /// Serialize `partial` and shallow-merge it into the current state.
    pub fn update_with<T: Serialize>(&self, partial: &T) -> Result<Revision> {
        self.update(serde_json::to_value(partial)?)
    }

    /// Subscribe to state changes.
    ///
    /// The handle immediately receives a `Snapshot` of the current state,
    /// then one `Updated` event per applied merge.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        // Hold the write lock so the snapshot and the first live update
        // cannot race past each other.
        let _write = self.write_lock.lock();

        let handle = self.subscriptions.subscribe(config);
        self.subscriptions.send_to(
            handle.id,
            StateEvent::Snapshot {
                data: self.snapshot(),
                revision: self.revision(),
            },
        );
        handle
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }

    /// Tear the container down, notifying all subscribers.
    ///
    /// Called on provider unmount. Teardown is terminal; the state itself
    /// remains readable through existing references but no further events
    /// are delivered.
    pub(crate) fn close(&self) {
        self.subscriptions.close();
    }
}
