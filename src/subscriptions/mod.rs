//! Live subscriptions to container updates.
//!
//! Every subscriber receives the initial snapshot on subscribe, then one
//! `Updated` event per applied merge, in registration order. Slow
//! subscribers are dropped rather than blocking the writer.

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    DropReason, StateEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
};
