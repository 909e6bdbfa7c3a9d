use crate::{
    error::OrderError,
    order::{
        id::{ActivityId, OrderId, UserId},
        request::CreateOrder,
        state::OrderStatus,
    },
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use derive_more::Constructor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `Order` related identifiers.
pub mod id;

/// `Order` lifecycle states and the permitted transition table.
pub mod state;

/// `Order` creation request and its validation.
pub mod request;

/// Reason recorded when a `Pending` order exceeds its payment deadline and is auto-cancelled
/// by the scanner.
pub const CANCEL_REASON_PAYMENT_TIMEOUT: &str = "payment timeout";

/// Reason recorded when [`cancel_order`](crate::engine::OrderManager::cancel_order) is invoked
/// without an explicit reason.
pub const CANCEL_REASON_USER: &str = "user cancelled";

/// Point-in-time copy of the booked activity's details.
///
/// Copied at order creation so later edits to the activity leave historical orders untouched.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize, Constructor)]
pub struct ActivitySnapshot {
    pub id: ActivityId,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub price: Decimal,
}

impl ActivitySnapshot {
    /// Scheduled start of the activity occurrence.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.date.and_time(self.time).and_utc()
    }

    /// Scheduled end of the activity occurrence, given the assumed running `duration`.
    pub fn ends_at(&self, duration: TimeDelta) -> DateTime<Utc> {
        self.starts_at() + duration
    }
}

/// Registrant details captured at order creation. Immutable thereafter.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize, Constructor)]
pub struct Participant {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// One user's registration and payment record against one [`ActivitySnapshot`] occurrence.
///
/// Status only changes via the transition methods, which enforce the
/// [`OrderStatus`] table and stamp the corresponding timestamp exactly once.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub activity: ActivitySnapshot,
    pub participant: Participant,
    pub status: OrderStatus,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub payment_deadline: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
}

impl Order {
    /// Construct a new `Order` from a validated [`CreateOrder`] request.
    ///
    /// Zero-amount orders skip payment and are created directly in `Paid` with
    /// `paid_at = created_at`.
    pub(crate) fn create(
        user: UserId,
        request: CreateOrder,
        time_created: DateTime<Utc>,
        payment_grace: TimeDelta,
    ) -> Self {
        let CreateOrder {
            activity,
            participant,
        } = request;

        let amount = activity.price;

        let (status, paid_at) = if amount.is_zero() {
            (OrderStatus::Paid, Some(time_created))
        } else {
            (OrderStatus::Pending, None)
        };

        Self {
            id: OrderId::random(),
            user,
            activity,
            participant,
            status,
            amount,
            created_at: time_created,
            payment_deadline: time_created + payment_grace,
            paid_at,
            cancelled_at: None,
            completed_at: None,
            cancel_reason: None,
        }
    }

    pub(crate) fn mark_paid(&mut self, time: DateTime<Utc>) -> Result<(), OrderError> {
        self.guard_transition(OrderStatus::Paid)?;
        self.status = OrderStatus::Paid;
        self.paid_at = Some(self.clamp_to_created(time));
        Ok(())
    }

    pub(crate) fn mark_cancelled(
        &mut self,
        time: DateTime<Utc>,
        reason: String,
    ) -> Result<(), OrderError> {
        self.guard_transition(OrderStatus::Cancelled)?;
        self.status = OrderStatus::Cancelled;
        self.cancelled_at = Some(self.clamp_to_created(time));
        self.cancel_reason = Some(reason);
        Ok(())
    }

    pub(crate) fn mark_completed(&mut self, time: DateTime<Utc>) -> Result<(), OrderError> {
        self.guard_transition(OrderStatus::Completed)?;
        self.status = OrderStatus::Completed;
        self.completed_at = Some(self.clamp_to_created(time));
        Ok(())
    }

    fn guard_transition(&self, to: OrderStatus) -> Result<(), OrderError> {
        if self.status.can_transition(to) {
            Ok(())
        } else {
            Err(OrderError::InvalidTransition {
                from: self.status,
                to,
            })
        }
    }

    /// Transition timestamps are monotonically non-decreasing relative to `created_at`.
    fn clamp_to_created(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        time.max(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(price: Decimal) -> ActivitySnapshot {
        ActivitySnapshot::new(
            ActivityId::new("act-1"),
            "Weekend Basketball".to_string(),
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            "Court 3".to_string(),
            price,
        )
    }

    fn create_order(price: Decimal) -> Order {
        Order::create(
            UserId::new("user-1"),
            CreateOrder::new(
                snapshot(price),
                Participant::new("Zhang".to_string(), "13800000000".to_string(), None, None),
            ),
            Utc::now(),
            TimeDelta::minutes(30),
        )
    }

    #[test]
    fn test_create_priced_order_is_pending_with_deadline() {
        let order = create_order(dec!(30));

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.amount, dec!(30));
        assert_eq!(order.paid_at, None);
        assert_eq!(
            order.payment_deadline,
            order.created_at + TimeDelta::minutes(30)
        );
    }

    #[test]
    fn test_create_free_order_is_paid_immediately() {
        let order = create_order(dec!(0));

        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.amount, Decimal::ZERO);
        assert_eq!(order.paid_at, Some(order.created_at));
    }

    #[test]
    fn test_mark_paid_rejects_terminal_state_and_leaves_order_unchanged() {
        let mut order = create_order(dec!(30));
        order
            .mark_cancelled(Utc::now(), CANCEL_REASON_USER.to_string())
            .unwrap();

        let before = order.clone();
        let error = order.mark_paid(Utc::now()).unwrap_err();

        assert_eq!(
            error,
            OrderError::InvalidTransition {
                from: OrderStatus::Cancelled,
                to: OrderStatus::Paid,
            }
        );
        assert_eq!(order, before);
    }

    #[test]
    fn test_transition_timestamps_clamped_to_created_at() {
        let mut order = create_order(dec!(30));

        order
            .mark_paid(order.created_at - TimeDelta::seconds(5))
            .unwrap();

        assert_eq!(order.paid_at, Some(order.created_at));
    }

    #[test]
    fn test_activity_ends_at() {
        let snapshot = snapshot(dec!(30));

        assert_eq!(
            snapshot.ends_at(TimeDelta::hours(2)),
            snapshot.starts_at() + TimeDelta::hours(2)
        );
    }
}
