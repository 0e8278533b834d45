use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of "now" for token issuance and validation. Must be side-effect free.
pub type TimeFunc = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Wall-clock UTC time.
pub fn system_time() -> TimeFunc {
    Arc::new(Utc::now)
}

/// A clock stuck at `instant`.
pub fn frozen_at(instant: DateTime<Utc>) -> TimeFunc {
    Arc::new(move || instant)
}
