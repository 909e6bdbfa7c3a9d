use crate::order::{Order, id::OrderId};
use rand::{Rng, prelude::IndexedRandom};

/// Externally-triggered order status change, eg/ payment completed from another device.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ExternalEvent {
    PaymentConfirmed(OrderId),
}

/// Pluggable source of [`ExternalEvent`]s, polled by the session on its own interval.
///
/// Stand-in for what would be a push/poll channel from a payment backend in a production
/// system. Defaults to [`NoOpEventSource`].
pub trait ExternalEventSource: Send {
    /// Poll for externally-triggered events against the current `Pending` order set.
    fn poll(&mut self, pending: &[Order]) -> Vec<ExternalEvent>;
}

/// [`ExternalEventSource`] that never produces events - the production default.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoOpEventSource;

impl ExternalEventSource for NoOpEventSource {
    fn poll(&mut self, _: &[Order]) -> Vec<ExternalEvent> {
        Vec::new()
    }
}

/// Demo [`ExternalEventSource`] that randomly confirms payment of one `Pending` order per
/// poll with the configured probability.
#[derive(Debug, Copy, Clone)]
pub struct RandomPaymentSource {
    pub probability: f64,
}

impl Default for RandomPaymentSource {
    fn default() -> Self {
        Self { probability: 0.3 }
    }
}

impl ExternalEventSource for RandomPaymentSource {
    fn poll(&mut self, pending: &[Order]) -> Vec<ExternalEvent> {
        let mut thread_rng = rand::rng();

        if pending.is_empty() || !thread_rng.random_bool(self.probability) {
            return Vec::new();
        }

        pending
            .choose(&mut thread_rng)
            .map(|order| ExternalEvent::PaymentConfirmed(order.id.clone()))
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{
        ActivitySnapshot, Participant,
        id::{ActivityId, UserId},
        request::CreateOrder,
    };
    use chrono::{NaiveDate, NaiveTime, TimeDelta, Utc};
    use rust_decimal_macros::dec;

    fn pending_order() -> Order {
        Order::create(
            UserId::new("user-1"),
            CreateOrder::new(
                ActivitySnapshot::new(
                    ActivityId::new("act-1"),
                    "Evening Swim".to_string(),
                    NaiveDate::from_ymd_opt(2025, 6, 18).unwrap(),
                    NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
                    "Pool 1".to_string(),
                    dec!(25),
                ),
                Participant::new("Zhang".to_string(), "13800000000".to_string(), None, None),
            ),
            Utc::now(),
            TimeDelta::minutes(30),
        )
    }

    #[test]
    fn test_random_payment_source_confirms_one_pending_order() {
        let mut source = RandomPaymentSource { probability: 1.0 };
        let pending = vec![pending_order()];

        let events = source.poll(&pending);

        assert_eq!(
            events,
            vec![ExternalEvent::PaymentConfirmed(pending[0].id.clone())]
        );
    }

    #[test]
    fn test_random_payment_source_noop_without_pending_orders() {
        let mut source = RandomPaymentSource { probability: 1.0 };

        assert!(source.poll(&[]).is_empty());
    }
}
