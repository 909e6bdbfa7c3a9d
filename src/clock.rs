use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

/// Defines how an [`OrderManager`](crate::engine::OrderManager) determines the current time.
///
/// Generally a manager will use a:
/// * [`LiveClock`] in production.
/// * [`ManualClock`] in tests, to drive the payment-deadline scanner deterministically.
pub trait SessionClock {
    fn time(&self) -> DateTime<Utc>;
}

/// Live `Clock` using `Utc::now()`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct LiveClock;

impl SessionClock for LiveClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable `Clock` shared between a test and the manager it drives.
///
/// Stores unix millis so clones observe updates without locking.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.timestamp_millis())),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        self.millis.store(time.timestamp_millis(), Ordering::Relaxed);
    }

    pub fn advance(&self, delta: chrono::TimeDelta) {
        self.millis
            .fetch_add(delta.num_milliseconds(), Ordering::Relaxed);
    }
}

impl SessionClock for ManualClock {
    fn time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::Relaxed))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
