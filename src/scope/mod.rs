//! Provider scoping and the accessor hook.
//!
//! A `Provider` mounts a container on a thread-local stack for the
//! duration of a closure; `use_app_state` binds to the innermost mounted
//! container. This gives descendants access to the shared state without
//! explicit threading of the value, scoped to the provider's extent only.

mod provider;

pub use provider::{use_app_state, use_app_state_raw, Provider, ProviderGuard, Setter};
