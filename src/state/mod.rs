//! State container and merge semantics.
//!
//! After any sequence of updates, the state is the left-to-right shallow
//! fold of the initial state with every partial applied in call order.

mod container;
mod operations;

pub use container::StateContainer;
pub use operations::{shallow_merge, touched_keys, value_type_name};
