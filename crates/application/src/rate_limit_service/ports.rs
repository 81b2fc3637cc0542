use chrono::{DateTime, Utc};

/// Time source for window calculations.
///
/// Infrastructure supplies the wall clock; tests drive time by hand.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}
