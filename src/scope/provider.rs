//! Provider mounting and the `use_app_state` accessor.

use crate::error::{Result, StateError};
use crate::state::StateContainer;
use crate::types::Revision;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::sync::Arc;

// Thread-local stack of mounted providers. The innermost mount is the
// "nearest enclosing" container for the accessor.
thread_local! {
    static PROVIDER_STACK: RefCell<Vec<Arc<StateContainer>>> = RefCell::new(vec![]);
}

/// Establishes a state container's scope.
///
/// A provider holds one container, seeded with an initial state at
/// construction. Mounting makes the container visible to `use_app_state`
/// for the dynamic extent of a closure; unmounting tears the container
/// down and notifies its subscribers.
///
/// # Examples
///
/// ```
/// use appstate::{use_app_state, Provider};
/// use serde_json::{json, Value};
///
/// let result = Provider::mount(json!({"count": 0}), || {
///     let (state, set_state) = use_app_state::<Value>()?;
///     assert_eq!(state["count"], 0);
///     set_state.set(json!({"count": 1}))?;
///     Ok::<_, appstate::StateError>(())
/// }).unwrap();
/// result.unwrap();
/// ```
pub struct Provider {
    container: Arc<StateContainer>,
}

impl Provider {
    /// Create a provider seeded with `initial` state.
    ///
    /// Fails if `initial` is not a JSON object.
    pub fn new(initial: Value) -> Result<Self> {
        Ok(Self {
            container: Arc::new(StateContainer::new(initial)?),
        })
    }

    /// Create a provider, mount it, and run `f` inside its scope.
    ///
    /// The container is torn down when `f` returns (or unwinds).
    pub fn mount<F, R>(initial: Value, f: F) -> Result<R>
    where
        F: FnOnce() -> R,
    {
        let provider = Self::new(initial)?;
        let result = {
            let _guard = provider.enter();
            f()
        };
        Ok(result)
    }

    /// Mount this provider on the current thread.
    ///
    /// The returned guard keeps the provider's container at the top of the
    /// scope stack until it is dropped. Dropping the guard unmounts but
    /// does not tear down the container; teardown happens when the
    /// provider itself is dropped.
    pub fn enter(&self) -> ProviderGuard {
        PROVIDER_STACK.with(|stack| {
            stack.borrow_mut().push(Arc::clone(&self.container));
        });
        ProviderGuard { _private: () }
    }

    /// The container held by this provider.
    ///
    /// Useful for subscribing from outside the mounted scope.
    pub fn container(&self) -> &StateContainer {
        &self.container
    }
}

impl Drop for Provider {
    fn drop(&mut self) {
        self.container.close();
    }
}

/// Keeps a provider mounted; unmounts on drop (including unwind).
pub struct ProviderGuard {
    _private: (),
}

impl Drop for ProviderGuard {
    fn drop(&mut self) {
        PROVIDER_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// A write binding to a specific container.
///
/// The setter stays bound to the container it was created from, even if
/// other providers are mounted afterwards.
#[derive(Clone)]
pub struct Setter {
    container: Arc<StateContainer>,
}

impl std::fmt::Debug for Setter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Setter").finish_non_exhaustive()
    }
}

impl Setter {
    /// Shallow-merge a partial update into the bound container's state.
    pub fn set<T: Serialize>(&self, partial: T) -> Result<Revision> {
        self.container.update(serde_json::to_value(partial)?)
    }
}

/// Resolve the nearest enclosing container, failing loudly outside any
/// provider scope.
fn current_container() -> Result<Arc<StateContainer>> {
    PROVIDER_STACK
        .with(|stack| stack.borrow().last().cloned())
        .ok_or(StateError::NoProvider)
}

/// Read the nearest enclosing container's state as `T`, together with a
/// setter bound to that container.
///
/// `T` is a decoding convenience only; no runtime shape validation is
/// performed. Each call returns the state at the time of the call, fully
/// reflecting every update completed before it.
pub fn use_app_state<T: DeserializeOwned>() -> Result<(T, Setter)> {
    let container = current_container()?;
    let state = container.read()?;
    Ok((state, Setter { container }))
}

/// Untyped variant of [`use_app_state`]: the raw JSON snapshot.
pub fn use_app_state_raw() -> Result<(Value, Setter)> {
    let container = current_container()?;
    let state = container.snapshot();
    Ok((state, Setter { container }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessor_outside_provider_fails() {
        let err = use_app_state::<Value>().unwrap_err();
        assert!(matches!(err, StateError::NoProvider));
    }

    #[test]
    fn test_mount_exposes_state() {
        Provider::mount(json!({"count": 0}), || {
            let (state, _) = use_app_state_raw().unwrap();
            assert_eq!(state["count"], 0);
        })
        .unwrap();

        // Unmounted again
        assert!(use_app_state_raw().is_err());
    }

    #[test]
    fn test_setter_merges_into_container() {
        Provider::mount(json!({"count": 0, "name": "x"}), || {
            let (_, set_state) = use_app_state_raw().unwrap();
            set_state.set(json!({"count": 2})).unwrap();

            let (state, _) = use_app_state_raw().unwrap();
            assert_eq!(state, json!({"count": 2, "name": "x"}));
        })
        .unwrap();
    }

    #[test]
    fn test_nested_providers_bind_innermost() {
        Provider::mount(json!({"scope": "outer"}), || {
            Provider::mount(json!({"scope": "inner"}), || {
                let (state, set_state) = use_app_state_raw().unwrap();
                assert_eq!(state["scope"], "inner");
                set_state.set(json!({"scope": "inner2"})).unwrap();
            })
            .unwrap();

            // Inner update never touched the outer container
            let (state, _) = use_app_state_raw().unwrap();
            assert_eq!(state["scope"], "outer");
        })
        .unwrap();
    }

    #[test]
    fn test_setter_stays_bound_across_mounts() {
        Provider::mount(json!({"scope": "outer"}), || {
            let (_, outer_setter) = use_app_state_raw().unwrap();

            Provider::mount(json!({"scope": "inner"}), || {
                // Setter captured outside still targets the outer container
                outer_setter.set(json!({"scope": "outer2"})).unwrap();

                let (state, _) = use_app_state_raw().unwrap();
                assert_eq!(state["scope"], "inner");
            })
            .unwrap();

            let (state, _) = use_app_state_raw().unwrap();
            assert_eq!(state["scope"], "outer2");
        })
        .unwrap();
    }

    #[test]
    fn test_unmount_pops_on_panic() {
        let result = std::panic::catch_unwind(|| {
            Provider::mount(json!({}), || panic!("component failed")).unwrap();
        });
        assert!(result.is_err());

        // Stack was restored despite the unwind
        assert!(use_app_state_raw().is_err());
    }

    #[test]
    fn test_typed_accessor() {
        #[derive(serde::Deserialize)]
        struct TestingAppState {
            count: i64,
        }

        Provider::mount(json!({"count": 41}), || {
            let (state, set_state) = use_app_state::<TestingAppState>().unwrap();
            set_state.set(json!({"count": state.count + 1})).unwrap();

            let (state, _) = use_app_state::<TestingAppState>().unwrap();
            assert_eq!(state.count, 42);
        })
        .unwrap();
    }
}
