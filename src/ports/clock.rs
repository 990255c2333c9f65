//! Clock port for obtaining the current time.

use chrono::{DateTime, Local};

/// Provides the current local time.
///
/// Output directory names and run timestamps come from here, so tests can
/// pin them with a fixed clock.
pub trait Clock: Send + Sync {
    /// Returns the current local time.
    fn now(&self) -> DateTime<Local>;
}
