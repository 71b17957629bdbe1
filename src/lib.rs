//! # Appstate
//!
//! A shared application state container: a provider holds one JSON object
//! in memory, descendants read it and shallow-merge partial updates into
//! it, and every subscriber is notified after each update.
//!
//! ## Core Concepts
//!
//! - **StateContainer**: holds the current state, applies shallow merges,
//!   broadcasts to subscribers
//! - **Provider**: scopes a container to the dynamic extent of a closure
//! - **use_app_state**: binds to the nearest enclosing provider, returning
//!   a snapshot and a setter
//! - **Subscriptions**: channel-based live updates with an initial snapshot
//!
//! ## Example
//!
//! ```
//! use appstate::{use_app_state, Provider, StateError};
//! use serde_json::{json, Value};
//!
//! Provider::mount(json!({"count": 0, "stable": {"blank": "blank"}}), || {
//!     let (state, set_state) = use_app_state::<Value>()?;
//!     set_state.set(json!({"count": state["count"].as_i64().unwrap() + 1}))?;
//!
//!     let (state, _) = use_app_state::<Value>()?;
//!     assert_eq!(state["count"], 1);
//!     // Untouched keys survive the merge unchanged
//!     assert_eq!(state["stable"], json!({"blank": "blank"}));
//!     Ok::<_, StateError>(())
//! })
//! .unwrap()
//! .unwrap();
//! ```

pub mod error;
pub mod scope;
pub mod state;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{Result, StateError};
pub use scope::{use_app_state, use_app_state_raw, Provider, ProviderGuard, Setter};
pub use state::{shallow_merge, StateContainer};
pub use subscriptions::{
    DropReason, StateEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
    SubscriptionManager,
};
pub use types::{AppState, Revision};
