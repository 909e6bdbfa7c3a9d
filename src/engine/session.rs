use crate::{
    clock::SessionClock,
    engine::{
        OrderManager, OrderPolicy, OrderStats,
        request::{SessionRequest, SessionRequestKind},
    },
    error::OrderError,
    event::ExternalEventSource,
    notification::{Notification, NotificationId},
    order::{
        Order,
        id::{OrderId, UserId},
        request::CreateOrder,
        state::OrderStatus,
    },
    store::OrderStore,
};
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_stream::{StreamExt, wrappers::BroadcastStream};
use tracing::{debug, error, info};

const DEFAULT_SCAN_INTERVAL_MS: u64 = 10_000;
const DEFAULT_EXTERNAL_POLL_INTERVAL_MS: u64 = 30_000;
const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;

/// Configuration for one user's [`OrderSession`].
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct SessionConfig {
    pub user: UserId,

    /// Simulated network latency applied to responses, standing in for real I/O wait.
    #[serde(default)]
    pub latency_ms: u64,

    /// Payment-deadline scanner tick interval.
    #[serde(default = "SessionConfig::default_scan_interval_ms")]
    pub scan_interval_ms: u64,

    /// External event source poll interval.
    #[serde(default = "SessionConfig::default_external_poll_interval_ms")]
    pub external_poll_interval_ms: u64,

    #[serde(default)]
    pub policy: OrderPolicy,
}

impl SessionConfig {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            latency_ms: 0,
            scan_interval_ms: DEFAULT_SCAN_INTERVAL_MS,
            external_poll_interval_ms: DEFAULT_EXTERNAL_POLL_INTERVAL_MS,
            policy: OrderPolicy::default(),
        }
    }

    fn default_scan_interval_ms() -> u64 {
        DEFAULT_SCAN_INTERVAL_MS
    }

    fn default_external_poll_interval_ms() -> u64 {
        DEFAULT_EXTERNAL_POLL_INTERVAL_MS
    }
}

/// Single-writer runtime owning an [`OrderManager`] for one logged-in user.
///
/// All mutations arrive over the mpsc inbox and are applied sequentially, so concurrent
/// callers racing a `pay` and a `cancel` on the same order serialize - exactly one wins.
/// Two interval timers drive the payment-deadline scanner and the external event source
/// poll. Shutdown stops both timers and discards in-memory state without persisting.
#[derive(Debug)]
pub struct OrderSession<Store, Clock, Events> {
    latency_ms: u64,
    scan_interval_ms: u64,
    external_poll_interval_ms: u64,
    manager: OrderManager<Store, Clock>,
    events: Events,
    request_rx: mpsc::UnboundedReceiver<SessionRequest>,
    notification_tx: broadcast::Sender<Notification>,
}

impl<Store, Clock, Events> OrderSession<Store, Clock, Events>
where
    Store: OrderStore,
    Clock: SessionClock,
    Events: ExternalEventSource,
{
    /// Initialise an `OrderSession` and its paired [`SessionHandle`], loading the user's
    /// persisted order set from the provided [`OrderStore`].
    pub async fn init(
        config: SessionConfig,
        store: Store,
        clock: Clock,
        events: Events,
    ) -> Result<(Self, SessionHandle), OrderError> {
        let manager = OrderManager::load(
            config.user.clone(),
            store,
            clock,
            config.policy.clone(),
        )
        .await?;

        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (notification_tx, notification_rx) =
            broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);

        let session = Self {
            latency_ms: config.latency_ms,
            scan_interval_ms: config.scan_interval_ms,
            external_poll_interval_ms: config.external_poll_interval_ms,
            manager,
            events,
            request_rx,
            notification_tx,
        };

        let handle = SessionHandle {
            user: config.user,
            request_tx,
            notification_rx,
        };

        Ok((session, handle))
    }

    pub async fn run(mut self) {
        let mut scan_interval =
            tokio::time::interval(std::time::Duration::from_millis(self.scan_interval_ms));
        scan_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut poll_interval = tokio::time::interval(std::time::Duration::from_millis(
            self.external_poll_interval_ms,
        ));
        poll_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                request = self.request_rx.recv() => {
                    let Some(request) = request else {
                        // All handles dropped
                        break;
                    };

                    if self.handle_request(request).await {
                        break;
                    }
                }
                _ = scan_interval.tick() => {
                    let now = self.manager.time();
                    let transitioned = self.manager.scan_and_expire(now).await;
                    if !transitioned.is_empty() {
                        debug!(
                            user = %self.manager.user(),
                            transitioned = transitioned.len(),
                            "scanner pass applied auto-transitions"
                        );
                    }
                }
                _ = poll_interval.tick() => {
                    let pending = self.manager.orders(Some(OrderStatus::Pending));
                    let events = self.events.poll(&pending);
                    self.manager.apply_external(events).await;
                }
            }

            self.publish_notifications();
        }

        info!(user = %self.manager.user(), "OrderSession shutting down");
    }

    /// Apply one request, returning whether the session should shut down.
    async fn handle_request(&mut self, request: SessionRequest) -> bool {
        match request.kind {
            SessionRequestKind::CreateOrder {
                response_tx,
                request,
            } => {
                let response = self.manager.create_order(request).await;
                self.respond_with_latency(response_tx, response);
            }
            SessionRequestKind::PayOrder { response_tx, id } => {
                let response = self.manager.pay_order(&id).await;
                self.respond_with_latency(response_tx, response);
            }
            SessionRequestKind::CancelOrder {
                response_tx,
                id,
                reason,
            } => {
                let response = self.manager.cancel_order(&id, reason).await;
                self.respond_with_latency(response_tx, response);
            }
            SessionRequestKind::FetchOrders {
                response_tx,
                filter,
            } => {
                let orders = self.manager.orders(filter);
                self.respond_with_latency(response_tx, orders);
            }
            SessionRequestKind::FetchStats { response_tx } => {
                let stats = self.manager.stats();
                self.respond_with_latency(response_tx, stats);
            }
            SessionRequestKind::FetchNotifications { response_tx } => {
                let notifications = self.manager.notifications();
                self.respond_with_latency(response_tx, notifications);
            }
            SessionRequestKind::DismissNotification { response_tx, id } => {
                let dismissed = self.manager.dismiss_notification(&id);
                self.respond_with_latency(response_tx, dismissed);
            }
            SessionRequestKind::DismissAllNotifications { response_tx } => {
                let dismissed = self.manager.dismiss_all_notifications();
                self.respond_with_latency(response_tx, dismissed);
            }
            SessionRequestKind::Shutdown => return true,
        }

        false
    }

    /// Sends the provided `Response` via the [`oneshot::Sender`] after waiting for the
    /// configured latency.
    ///
    /// Used to simulate network latency between the session and its caller.
    fn respond_with_latency<Response>(
        &self,
        response_tx: oneshot::Sender<Response>,
        response: Response,
    ) where
        Response: Send + 'static,
    {
        let user = self.manager.user().clone();
        let latency = std::time::Duration::from_millis(self.latency_ms);

        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            if response_tx.send(response).is_err() {
                error!(
                    %user,
                    kind = std::any::type_name::<Response>(),
                    "OrderSession failed to send oneshot response to caller"
                );
            }
        });
    }

    /// Broadcast notifications emitted since the last loop iteration.
    ///
    /// A send error only means no subscriber is currently listening; the notification is
    /// still retained in the manager's buffer.
    fn publish_notifications(&mut self) {
        for notification in self.manager.drain_unpublished() {
            if self.notification_tx.send(notification).is_err() {
                debug!(
                    user = %self.manager.user(),
                    "no active subscribers for notification broadcast"
                );
            }
        }
    }
}

/// Caller-side handle to a running [`OrderSession`].
#[derive(Debug)]
pub struct SessionHandle {
    pub user: UserId,
    pub request_tx: mpsc::UnboundedSender<SessionRequest>,
    pub notification_rx: broadcast::Receiver<Notification>,
}

impl Clone for SessionHandle {
    fn clone(&self) -> Self {
        Self {
            user: self.user.clone(),
            request_tx: self.request_tx.clone(),
            notification_rx: self.notification_rx.resubscribe(),
        }
    }
}

impl SessionHandle {
    fn time_request(&self) -> DateTime<Utc> {
        Utc::now()
    }

    pub async fn create_order(&self, request: CreateOrder) -> Result<Order, OrderError> {
        let (response_tx, response_rx) = oneshot::channel();

        self.request_tx
            .send(SessionRequest::create_order(
                self.time_request(),
                response_tx,
                request,
            ))
            .expect("OrderSession is offline - failed to send request");

        response_rx
            .await
            .expect("OrderSession is offline - failed to receive response")
    }

    pub async fn pay_order(&self, id: OrderId) -> Result<Order, OrderError> {
        let (response_tx, response_rx) = oneshot::channel();

        self.request_tx
            .send(SessionRequest::pay_order(
                self.time_request(),
                response_tx,
                id,
            ))
            .expect("OrderSession is offline - failed to send request");

        response_rx
            .await
            .expect("OrderSession is offline - failed to receive response")
    }

    pub async fn cancel_order(
        &self,
        id: OrderId,
        reason: Option<String>,
    ) -> Result<Order, OrderError> {
        let (response_tx, response_rx) = oneshot::channel();

        self.request_tx
            .send(SessionRequest::cancel_order(
                self.time_request(),
                response_tx,
                id,
                reason,
            ))
            .expect("OrderSession is offline - failed to send request");

        response_rx
            .await
            .expect("OrderSession is offline - failed to receive response")
    }

    pub async fn orders(&self, filter: Option<OrderStatus>) -> Vec<Order> {
        let (response_tx, response_rx) = oneshot::channel();

        self.request_tx
            .send(SessionRequest::fetch_orders(
                self.time_request(),
                response_tx,
                filter,
            ))
            .expect("OrderSession is offline - failed to send request");

        response_rx
            .await
            .expect("OrderSession is offline - failed to receive response")
    }

    pub async fn stats(&self) -> OrderStats {
        let (response_tx, response_rx) = oneshot::channel();

        self.request_tx
            .send(SessionRequest::fetch_stats(
                self.time_request(),
                response_tx,
            ))
            .expect("OrderSession is offline - failed to send request");

        response_rx
            .await
            .expect("OrderSession is offline - failed to receive response")
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        let (response_tx, response_rx) = oneshot::channel();

        self.request_tx
            .send(SessionRequest::fetch_notifications(
                self.time_request(),
                response_tx,
            ))
            .expect("OrderSession is offline - failed to send request");

        response_rx
            .await
            .expect("OrderSession is offline - failed to receive response")
    }

    pub async fn dismiss_notification(&self, id: NotificationId) -> bool {
        let (response_tx, response_rx) = oneshot::channel();

        self.request_tx
            .send(SessionRequest::dismiss_notification(
                self.time_request(),
                response_tx,
                id,
            ))
            .expect("OrderSession is offline - failed to send request");

        response_rx
            .await
            .expect("OrderSession is offline - failed to receive response")
    }

    pub async fn dismiss_all_notifications(&self) -> usize {
        let (response_tx, response_rx) = oneshot::channel();

        self.request_tx
            .send(SessionRequest::dismiss_all_notifications(
                self.time_request(),
                response_tx,
            ))
            .expect("OrderSession is offline - failed to send request");

        response_rx
            .await
            .expect("OrderSession is offline - failed to receive response")
    }

    /// Stop the session's timers and discard its in-memory state without persisting.
    ///
    /// A no-op if the session is already down.
    pub fn shutdown(&self) {
        let _send_result = self
            .request_tx
            .send(SessionRequest::shutdown(self.time_request()));
    }

    /// Stream of notifications emitted by the session, terminating if the subscriber lags
    /// beyond the broadcast capacity.
    pub fn notification_stream(&self) -> BoxStream<'static, Notification> {
        futures::StreamExt::boxed(
            BroadcastStream::new(self.notification_rx.resubscribe()).map_while(|result| {
                match result {
                    Ok(notification) => Some(notification),
                    Err(error) => {
                        error!(?error, "notification broadcast stream lagged - terminating");
                        None
                    }
                }
            }),
        )
    }
}
