//! Core types for the state container.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The application state shape: an arbitrary string-keyed JSON object.
///
/// The container imposes no schema; any top-level key may be added or
/// replaced by a partial update. Keys are never removed automatically.
pub type AppState = serde_json::Map<String, Value>;

/// Monotonically increasing revision of a container's state.
///
/// The state a container is mounted with is revision 0; each applied
/// update bumps the revision by one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Revision(pub u64);

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rev({})", self.0)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Revision {
    pub fn next(self) -> Self {
        Revision(self.0 + 1)
    }
}
