use crate::{
    clock::SessionClock,
    error::OrderError,
    event::ExternalEvent,
    notification::{Notification, NotificationBuffer, NotificationId, NotificationKind},
    order::{
        CANCEL_REASON_PAYMENT_TIMEOUT, CANCEL_REASON_USER, Order,
        id::{OrderId, UserId},
        request::CreateOrder,
        state::OrderStatus,
    },
    store::OrderStore,
};
use chrono::{DateTime, TimeDelta, Utc};
use fnv::FnvHashMap;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::{debug, info, warn};

/// Single-writer session runtime around [`OrderManager`].
pub mod session;

/// Session request plumbing (mpsc inbox + oneshot responses).
pub mod request;

/// Business rules governing order auto-transitions and notification retention.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct OrderPolicy {
    /// Window after creation within which a `Pending` order must be paid before the scanner
    /// auto-cancels it.
    #[serde(default = "OrderPolicy::default_payment_grace_secs")]
    pub payment_grace_secs: i64,

    /// Assumed running time of an activity occurrence; `Paid` orders auto-complete once
    /// `date + time + duration` has passed.
    #[serde(default = "OrderPolicy::default_activity_duration_secs")]
    pub activity_duration_secs: i64,

    #[serde(default = "OrderPolicy::default_notification_capacity")]
    pub notification_capacity: usize,

    #[serde(default = "OrderPolicy::default_notification_info_ttl_secs")]
    pub notification_info_ttl_secs: i64,
}

impl OrderPolicy {
    fn default_payment_grace_secs() -> i64 {
        30 * 60
    }

    fn default_activity_duration_secs() -> i64 {
        2 * 60 * 60
    }

    fn default_notification_capacity() -> usize {
        50
    }

    fn default_notification_info_ttl_secs() -> i64 {
        10
    }

    pub fn payment_grace(&self) -> TimeDelta {
        TimeDelta::seconds(self.payment_grace_secs)
    }

    pub fn activity_duration(&self) -> TimeDelta {
        TimeDelta::seconds(self.activity_duration_secs)
    }

    pub fn notification_info_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.notification_info_ttl_secs)
    }
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            payment_grace_secs: Self::default_payment_grace_secs(),
            activity_duration_secs: Self::default_activity_duration_secs(),
            notification_capacity: Self::default_notification_capacity(),
            notification_info_ttl_secs: Self::default_notification_info_ttl_secs(),
        }
    }
}

/// Aggregation over the current order set.
#[derive(Debug, Clone, Eq, PartialEq, Default, Deserialize, Serialize)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub paid: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total_amount: Decimal,
    /// Sum of `amount` over `Paid` and `Completed` orders.
    pub paid_amount: Decimal,
}

/// Owns one user's order set and notification buffer, applying all lifecycle transitions.
///
/// Every mutation is save-then-commit: the prospective order set is written through the
/// [`OrderStore`] first, and only on success is the in-memory set updated and a
/// [`Notification`] emitted. A failed persist therefore leaves the previous in-memory state
/// fully intact.
#[derive(Debug)]
pub struct OrderManager<Store, Clock> {
    user: UserId,
    store: Store,
    clock: Clock,
    policy: OrderPolicy,
    orders: FnvHashMap<OrderId, Order>,
    notifications: NotificationBuffer,
    unpublished: Vec<Notification>,
}

impl<Store, Clock> OrderManager<Store, Clock>
where
    Store: OrderStore,
    Clock: SessionClock,
{
    /// Initialise an `OrderManager` for the provided user, loading any persisted order set.
    pub async fn load(
        user: UserId,
        store: Store,
        clock: Clock,
        policy: OrderPolicy,
    ) -> Result<Self, OrderError> {
        let orders = store
            .load(&user)
            .await?
            .into_iter()
            .map(|order| (order.id.clone(), order))
            .collect::<FnvHashMap<_, _>>();

        info!(
            user = %user,
            orders = orders.len(),
            "OrderManager loaded persisted order set"
        );

        let notifications = NotificationBuffer::new(
            policy.notification_capacity,
            policy.notification_info_ttl(),
        );

        Ok(Self {
            user,
            store,
            clock,
            policy,
            orders,
            notifications,
            unpublished: Vec::new(),
        })
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.clock.time()
    }

    /// Create a new [`Order`] from the provided request.
    ///
    /// Zero-amount orders are created directly in `Paid` (no payment required); all others
    /// start `Pending` with a payment deadline of `now + payment_grace`.
    pub async fn create_order(&mut self, request: CreateOrder) -> Result<Order, OrderError> {
        request.validate()?;

        let order = Order::create(
            self.user.clone(),
            request,
            self.time(),
            self.policy.payment_grace(),
        );

        let order = self.commit(order).await?;

        info!(
            user = %self.user,
            order = %order.id,
            status = %order.status,
            amount = %order.amount,
            "order created"
        );
        self.notify(
            NotificationKind::Info,
            "Order created",
            format!("Registered for {}", order.activity.title),
            Some(order.id.clone()),
        );

        Ok(order)
    }

    /// Transition a `Pending` [`Order`] to `Paid`.
    pub async fn pay_order(&mut self, id: &OrderId) -> Result<Order, OrderError> {
        let mut order = self.find(id)?;
        order.mark_paid(self.time())?;

        let order = self.commit(order).await?;

        info!(user = %self.user, order = %order.id, "order paid");
        self.notify(
            NotificationKind::Success,
            "Payment successful",
            format!("Payment received for {}", order.activity.title),
            Some(order.id.clone()),
        );

        Ok(order)
    }

    /// Transition a `Pending` or `Paid` [`Order`] to `Cancelled`.
    pub async fn cancel_order(
        &mut self,
        id: &OrderId,
        reason: Option<String>,
    ) -> Result<Order, OrderError> {
        let mut order = self.find(id)?;
        order.mark_cancelled(
            self.time(),
            reason.unwrap_or_else(|| CANCEL_REASON_USER.to_string()),
        )?;

        let order = self.commit(order).await?;

        info!(
            user = %self.user,
            order = %order.id,
            reason = order.cancel_reason.as_deref().unwrap_or_default(),
            "order cancelled"
        );
        self.notify(
            NotificationKind::Error,
            "Order cancelled",
            format!("Cancelled booking for {}", order.activity.title),
            Some(order.id.clone()),
        );

        Ok(order)
    }

    /// Scan the order set for auto-transitions due at `now`, returning the orders that
    /// changed state this pass.
    ///
    /// * `Pending` orders past their payment deadline are cancelled with reason
    ///   "payment timeout".
    /// * `Paid` orders whose activity occurrence has ended are completed.
    ///
    /// Idempotent: a second pass at the same `now` with no intervening mutations returns
    /// an empty list. A failed persist for one order is logged and skipped without aborting
    /// the pass. Stale `Info` notifications are pruned as a side effect.
    pub async fn scan_and_expire(&mut self, now: DateTime<Utc>) -> Vec<Order> {
        let expired: Vec<OrderId> = self
            .orders
            .values()
            .filter(|order| {
                order.status == OrderStatus::Pending && order.payment_deadline < now
            })
            .map(|order| order.id.clone())
            .collect();

        let finished: Vec<OrderId> = self
            .orders
            .values()
            .filter(|order| {
                order.status == OrderStatus::Paid
                    && order.activity.ends_at(self.policy.activity_duration()) < now
            })
            .map(|order| order.id.clone())
            .collect();

        let mut transitioned = Vec::with_capacity(expired.len() + finished.len());

        for id in expired {
            match self.expire_order(&id, now).await {
                Ok(order) => transitioned.push(order),
                Err(error) => {
                    warn!(user = %self.user, order = %id, %error, "scanner skipped order");
                }
            }
        }

        for id in finished {
            match self.complete_order(&id, now).await {
                Ok(order) => transitioned.push(order),
                Err(error) => {
                    warn!(user = %self.user, order = %id, %error, "scanner skipped order");
                }
            }
        }

        self.notifications.prune_expired(now);

        transitioned
    }

    /// Apply externally-triggered status changes, eg/ a payment confirmed from another
    /// device. Events referencing unknown or already-transitioned orders are skipped.
    pub async fn apply_external(&mut self, events: Vec<ExternalEvent>) {
        for event in events {
            match event {
                ExternalEvent::PaymentConfirmed(id) => {
                    if let Err(error) = self.pay_order(&id).await {
                        debug!(
                            user = %self.user,
                            order = %id,
                            %error,
                            "external payment event skipped"
                        );
                    }
                }
            }
        }
    }

    /// Current orders, optionally filtered by status, newest first.
    pub fn orders(&self, filter: Option<OrderStatus>) -> Vec<Order> {
        self.orders
            .values()
            .filter(|order| filter.is_none_or(|status| order.status == status))
            .cloned()
            .sorted_unstable_by_key(|order| Reverse(order.created_at))
            .collect()
    }

    /// Aggregate [`OrderStats`] over the current order set.
    pub fn stats(&self) -> OrderStats {
        self.orders
            .values()
            .fold(OrderStats::default(), |mut stats, order| {
                stats.total += 1;
                stats.total_amount += order.amount;
                match order.status {
                    OrderStatus::Pending => stats.pending += 1,
                    OrderStatus::Paid => {
                        stats.paid += 1;
                        stats.paid_amount += order.amount;
                    }
                    OrderStatus::Completed => {
                        stats.completed += 1;
                        stats.paid_amount += order.amount;
                    }
                    OrderStatus::Cancelled => stats.cancelled += 1,
                }
                stats
            })
    }

    /// Current notifications, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.notifications().cloned().collect()
    }

    pub fn dismiss_notification(&mut self, id: &NotificationId) -> bool {
        self.notifications.dismiss(id)
    }

    pub fn dismiss_all_notifications(&mut self) -> usize {
        self.notifications.dismiss_all()
    }

    /// Drain notifications emitted since the last call, for broadcast to subscribers.
    pub fn drain_unpublished(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.unpublished)
    }

    async fn expire_order(
        &mut self,
        id: &OrderId,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        let mut order = self.find(id)?;
        order.mark_cancelled(now, CANCEL_REASON_PAYMENT_TIMEOUT.to_string())?;

        let order = self.commit(order).await?;

        info!(user = %self.user, order = %order.id, "order auto-cancelled on payment timeout");
        self.notify(
            NotificationKind::Warning,
            "Order expired",
            format!(
                "Payment window elapsed for {} - booking cancelled",
                order.activity.title
            ),
            Some(order.id.clone()),
        );

        Ok(order)
    }

    async fn complete_order(
        &mut self,
        id: &OrderId,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        let mut order = self.find(id)?;
        order.mark_completed(now)?;

        let order = self.commit(order).await?;

        info!(user = %self.user, order = %order.id, "order auto-completed after activity end");
        self.notify(
            NotificationKind::Success,
            "Order completed",
            format!("{} has finished - see you next time", order.activity.title),
            Some(order.id.clone()),
        );

        Ok(order)
    }

    fn find(&self, id: &OrderId) -> Result<Order, OrderError> {
        self.orders
            .get(id)
            .cloned()
            .ok_or_else(|| OrderError::NotFound(id.clone()))
    }

    /// Persist the prospective order set containing `order`, committing to memory only on
    /// success.
    async fn commit(&mut self, order: Order) -> Result<Order, OrderError> {
        let prospective: Vec<Order> = self
            .orders
            .values()
            .filter(|existing| existing.id != order.id)
            .cloned()
            .chain(std::iter::once(order.clone()))
            .collect();

        self.store.save(&self.user, &prospective).await?;
        self.orders.insert(order.id.clone(), order.clone());

        Ok(order)
    }

    fn notify(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        order: Option<OrderId>,
    ) {
        let notification = self
            .notifications
            .push(kind, title, message, self.clock.time(), order);
        self.unpublished.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        error::StoreError,
        order::{ActivitySnapshot, Participant, id::ActivityId},
        store::memory::InMemoryStore,
    };
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    /// [`OrderStore`] whose saves can be failed on demand, for rollback assertions.
    #[derive(Debug, Clone, Default)]
    struct FlakyStore {
        inner: InMemoryStore,
        fail_saves: Arc<AtomicBool>,
    }

    impl FlakyStore {
        fn fail_saves(&self, fail: bool) {
            self.fail_saves.store(fail, Ordering::Relaxed);
        }
    }

    impl OrderStore for FlakyStore {
        async fn load(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
            self.inner.load(user).await
        }

        async fn save(&self, user: &UserId, orders: &[Order]) -> Result<(), StoreError> {
            if self.fail_saves.load(Ordering::Relaxed) {
                return Err(StoreError::Unavailable("injected save failure".to_string()));
            }
            self.inner.save(user, orders).await
        }
    }

    fn activity(price: Decimal, date: NaiveDate) -> ActivitySnapshot {
        ActivitySnapshot::new(
            ActivityId::new("act-1"),
            "Weekend Basketball".to_string(),
            date,
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            "Court 3".to_string(),
            price,
        )
    }

    fn create_request(price: Decimal) -> CreateOrder {
        CreateOrder::new(
            activity(price, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()),
            Participant::new("Zhang".to_string(), "13800000000".to_string(), None, None),
        )
    }

    fn time_base() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 6, 14)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
            .and_utc()
    }

    async fn manager(
        clock: ManualClock,
    ) -> OrderManager<InMemoryStore, ManualClock> {
        OrderManager::load(
            UserId::new("user-1"),
            InMemoryStore::new(),
            clock,
            OrderPolicy::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_pay_then_auto_complete() {
        let clock = ManualClock::new(time_base());
        let mut manager = manager(clock.clone()).await;

        // Create: priced order starts Pending
        let order = manager.create_order(create_request(dec!(30))).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.amount, dec!(30));

        // Pay: transitions to Paid with paid_at stamped
        clock.advance(TimeDelta::minutes(5));
        let order = manager.pay_order(&order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.paid_at, Some(clock.time()));

        // Scan 1 hour after activity end: auto-completes
        let after_end = order
            .activity
            .ends_at(TimeDelta::hours(2))
            + TimeDelta::hours(1);
        let transitioned = manager.scan_and_expire(after_end).await;

        assert_eq!(transitioned.len(), 1);
        assert_eq!(transitioned[0].status, OrderStatus::Completed);
        assert_eq!(transitioned[0].completed_at, Some(after_end));
    }

    #[tokio::test]
    async fn test_create_free_order_is_paid_immediately() {
        let mut manager = manager(ManualClock::new(time_base())).await;

        let order = manager.create_order(create_request(dec!(0))).await.unwrap();

        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_participant_fields() {
        let mut manager = manager(ManualClock::new(time_base())).await;

        let request = CreateOrder::new(
            activity(dec!(30), NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()),
            Participant::new("".to_string(), "13800000000".to_string(), None, None),
        );

        assert!(matches!(
            manager.create_order(request).await,
            Err(OrderError::Validation(_))
        ));
        assert!(manager.orders(None).is_empty());
    }

    #[tokio::test]
    async fn test_unpaid_order_expires_after_grace_period() {
        let clock = ManualClock::new(time_base());
        let mut manager = manager(clock.clone()).await;

        let order = manager.create_order(create_request(dec!(30))).await.unwrap();

        // 1 minute past the 30 minute grace window
        let scan_time = time_base() + TimeDelta::minutes(31);
        clock.set(scan_time);
        let transitioned = manager.scan_and_expire(scan_time).await;

        assert_eq!(transitioned.len(), 1);
        assert_eq!(transitioned[0].id, order.id);
        assert_eq!(transitioned[0].status, OrderStatus::Cancelled);
        assert_eq!(
            transitioned[0].cancel_reason.as_deref(),
            Some(CANCEL_REASON_PAYMENT_TIMEOUT)
        );

        // Exactly one warning notification was emitted for the expiry
        let warnings = manager
            .notifications()
            .into_iter()
            .filter(|notification| notification.kind == NotificationKind::Warning)
            .count();
        assert_eq!(warnings, 1);
    }

    #[tokio::test]
    async fn test_scan_is_idempotent_for_same_now() {
        let clock = ManualClock::new(time_base());
        let mut manager = manager(clock.clone()).await;

        manager.create_order(create_request(dec!(30))).await.unwrap();

        let scan_time = time_base() + TimeDelta::minutes(31);
        let first = manager.scan_and_expire(scan_time).await;
        let second = manager.scan_and_expire(scan_time).await;

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_scan_before_deadline_is_noop() {
        let clock = ManualClock::new(time_base());
        let mut manager = manager(clock.clone()).await;

        manager.create_order(create_request(dec!(30))).await.unwrap();

        let transitioned = manager
            .scan_and_expire(time_base() + TimeDelta::minutes(29))
            .await;

        assert!(transitioned.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_completed_order_is_invalid_transition() {
        let clock = ManualClock::new(time_base());
        let mut manager = manager(clock.clone()).await;

        let order = manager.create_order(create_request(dec!(30))).await.unwrap();
        manager.pay_order(&order.id).await.unwrap();

        let after_end = order.activity.ends_at(TimeDelta::hours(2)) + TimeDelta::hours(1);
        manager.scan_and_expire(after_end).await;

        let error = manager.cancel_order(&order.id, None).await.unwrap_err();

        assert_eq!(
            error,
            OrderError::InvalidTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Cancelled,
            }
        );
        assert_eq!(
            manager.orders(Some(OrderStatus::Completed)).len(),
            1,
            "status must be unchanged after rejected transition"
        );
    }

    #[tokio::test]
    async fn test_pay_unknown_order_is_not_found() {
        let mut manager = manager(ManualClock::new(time_base())).await;

        let unknown = OrderId::new("missing");

        assert_eq!(
            manager.pay_order(&unknown).await.unwrap_err(),
            OrderError::NotFound(unknown)
        );
    }

    #[tokio::test]
    async fn test_cancel_reason_defaults_to_user_cancelled() {
        let mut manager = manager(ManualClock::new(time_base())).await;

        let order = manager.create_order(create_request(dec!(30))).await.unwrap();
        let cancelled = manager.cancel_order(&order.id, None).await.unwrap();

        assert_eq!(cancelled.cancel_reason.as_deref(), Some(CANCEL_REASON_USER));
    }

    #[tokio::test]
    async fn test_stats_consistency_over_mixed_lifecycle() {
        let clock = ManualClock::new(time_base());
        let mut manager = manager(clock.clone()).await;

        let paid = manager.create_order(create_request(dec!(30))).await.unwrap();
        manager.pay_order(&paid.id).await.unwrap();

        let cancelled = manager.create_order(create_request(dec!(50))).await.unwrap();
        manager
            .cancel_order(&cancelled.id, Some("changed plans".to_string()))
            .await
            .unwrap();

        manager.create_order(create_request(dec!(40))).await.unwrap();

        let stats = manager.stats();

        assert_eq!(
            stats.total,
            stats.pending + stats.paid + stats.completed + stats.cancelled
        );
        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.paid, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.total_amount, dec!(120));
        assert_eq!(stats.paid_amount, dec!(30));
        assert!(stats.paid_amount <= stats.total_amount);
    }

    #[tokio::test]
    async fn test_orders_query_filters_and_sorts_newest_first() {
        let clock = ManualClock::new(time_base());
        let mut manager = manager(clock.clone()).await;

        let first = manager.create_order(create_request(dec!(30))).await.unwrap();
        clock.advance(TimeDelta::minutes(1));
        let second = manager.create_order(create_request(dec!(40))).await.unwrap();
        clock.advance(TimeDelta::minutes(1));
        let third = manager.create_order(create_request(dec!(50))).await.unwrap();

        manager.pay_order(&second.id).await.unwrap();

        let all = manager.orders(None);
        let all_ids: Vec<_> = all.iter().map(|order| order.id.clone()).collect();
        assert_eq!(all_ids, vec![third.id.clone(), second.id.clone(), first.id]);

        let pending = manager.orders(Some(OrderStatus::Pending));
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|order| order.status == OrderStatus::Pending));
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_in_memory_state() {
        let clock = ManualClock::new(time_base());
        let store = FlakyStore::default();
        let mut manager = OrderManager::load(
            UserId::new("user-1"),
            store.clone(),
            clock.clone(),
            OrderPolicy::default(),
        )
        .await
        .unwrap();

        let order = manager.create_order(create_request(dec!(30))).await.unwrap();
        let orders_before = manager.orders(None);
        let stats_before = manager.stats();

        store.fail_saves(true);

        assert!(matches!(
            manager.pay_order(&order.id).await,
            Err(OrderError::Store(StoreError::Unavailable(_)))
        ));
        assert_eq!(manager.orders(None), orders_before);
        assert_eq!(manager.stats(), stats_before);

        // Retry succeeds once the store recovers
        store.fail_saves(false);
        let paid = manager.pay_order(&order.id).await.unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_scanner_skips_failing_order_without_aborting_pass() {
        let clock = ManualClock::new(time_base());
        let store = FlakyStore::default();
        let mut manager = OrderManager::load(
            UserId::new("user-1"),
            store.clone(),
            clock.clone(),
            OrderPolicy::default(),
        )
        .await
        .unwrap();

        manager.create_order(create_request(dec!(30))).await.unwrap();
        manager.create_order(create_request(dec!(40))).await.unwrap();

        store.fail_saves(true);
        let scan_time = time_base() + TimeDelta::minutes(31);
        let transitioned = manager.scan_and_expire(scan_time).await;

        // Both saves failed, nothing transitioned, both orders still Pending
        assert!(transitioned.is_empty());
        assert_eq!(manager.orders(Some(OrderStatus::Pending)).len(), 2);

        // Next pass picks them both up once the store recovers
        store.fail_saves(false);
        let transitioned = manager.scan_and_expire(scan_time).await;
        assert_eq!(transitioned.len(), 2);
    }

    #[tokio::test]
    async fn test_apply_external_payment_confirmations() {
        let clock = ManualClock::new(time_base());
        let mut manager = manager(clock.clone()).await;

        let order = manager.create_order(create_request(dec!(30))).await.unwrap();

        manager
            .apply_external(vec![
                ExternalEvent::PaymentConfirmed(order.id.clone()),
                // Unknown order id is skipped without surfacing an error
                ExternalEvent::PaymentConfirmed(OrderId::new("missing")),
            ])
            .await;

        assert_eq!(manager.orders(Some(OrderStatus::Paid)).len(), 1);
    }

    #[tokio::test]
    async fn test_order_set_survives_reload_from_store() {
        let clock = ManualClock::new(time_base());
        let store = InMemoryStore::new();
        let user = UserId::new("user-1");

        let order = {
            let mut manager = OrderManager::load(
                user.clone(),
                store.clone(),
                clock.clone(),
                OrderPolicy::default(),
            )
            .await
            .unwrap();
            manager.create_order(create_request(dec!(30))).await.unwrap()
        };

        let reloaded = OrderManager::load(user, store, clock, OrderPolicy::default())
            .await
            .unwrap();

        assert_eq!(reloaded.orders(None), vec![order]);
    }
}
