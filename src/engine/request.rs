use crate::{
    engine::OrderStats,
    error::OrderError,
    notification::{Notification, NotificationId},
    order::{Order, id::OrderId, request::CreateOrder, state::OrderStatus},
};
use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

/// Request sent to a running [`OrderSession`](super::session::OrderSession) via its mpsc
/// inbox. Responses travel back over the per-request `oneshot` channel.
#[derive(Debug)]
pub struct SessionRequest {
    pub time_request: DateTime<Utc>,
    pub kind: SessionRequestKind,
}

impl SessionRequest {
    pub fn new(time_request: DateTime<Utc>, kind: SessionRequestKind) -> Self {
        Self { time_request, kind }
    }

    pub fn create_order(
        time_request: DateTime<Utc>,
        response_tx: oneshot::Sender<Result<Order, OrderError>>,
        request: CreateOrder,
    ) -> Self {
        Self::new(
            time_request,
            SessionRequestKind::CreateOrder {
                response_tx,
                request,
            },
        )
    }

    pub fn pay_order(
        time_request: DateTime<Utc>,
        response_tx: oneshot::Sender<Result<Order, OrderError>>,
        id: OrderId,
    ) -> Self {
        Self::new(
            time_request,
            SessionRequestKind::PayOrder { response_tx, id },
        )
    }

    pub fn cancel_order(
        time_request: DateTime<Utc>,
        response_tx: oneshot::Sender<Result<Order, OrderError>>,
        id: OrderId,
        reason: Option<String>,
    ) -> Self {
        Self::new(
            time_request,
            SessionRequestKind::CancelOrder {
                response_tx,
                id,
                reason,
            },
        )
    }

    pub fn fetch_orders(
        time_request: DateTime<Utc>,
        response_tx: oneshot::Sender<Vec<Order>>,
        filter: Option<OrderStatus>,
    ) -> Self {
        Self::new(
            time_request,
            SessionRequestKind::FetchOrders {
                response_tx,
                filter,
            },
        )
    }

    pub fn fetch_stats(
        time_request: DateTime<Utc>,
        response_tx: oneshot::Sender<OrderStats>,
    ) -> Self {
        Self::new(time_request, SessionRequestKind::FetchStats { response_tx })
    }

    pub fn fetch_notifications(
        time_request: DateTime<Utc>,
        response_tx: oneshot::Sender<Vec<Notification>>,
    ) -> Self {
        Self::new(
            time_request,
            SessionRequestKind::FetchNotifications { response_tx },
        )
    }

    pub fn dismiss_notification(
        time_request: DateTime<Utc>,
        response_tx: oneshot::Sender<bool>,
        id: NotificationId,
    ) -> Self {
        Self::new(
            time_request,
            SessionRequestKind::DismissNotification { response_tx, id },
        )
    }

    pub fn dismiss_all_notifications(
        time_request: DateTime<Utc>,
        response_tx: oneshot::Sender<usize>,
    ) -> Self {
        Self::new(
            time_request,
            SessionRequestKind::DismissAllNotifications { response_tx },
        )
    }

    pub fn shutdown(time_request: DateTime<Utc>) -> Self {
        Self::new(time_request, SessionRequestKind::Shutdown)
    }
}

#[derive(Debug)]
pub enum SessionRequestKind {
    CreateOrder {
        response_tx: oneshot::Sender<Result<Order, OrderError>>,
        request: CreateOrder,
    },
    PayOrder {
        response_tx: oneshot::Sender<Result<Order, OrderError>>,
        id: OrderId,
    },
    CancelOrder {
        response_tx: oneshot::Sender<Result<Order, OrderError>>,
        id: OrderId,
        reason: Option<String>,
    },
    FetchOrders {
        response_tx: oneshot::Sender<Vec<Order>>,
        filter: Option<OrderStatus>,
    },
    FetchStats {
        response_tx: oneshot::Sender<OrderStats>,
    },
    FetchNotifications {
        response_tx: oneshot::Sender<Vec<Notification>>,
    },
    DismissNotification {
        response_tx: oneshot::Sender<bool>,
        id: NotificationId,
    },
    DismissAllNotifications {
        response_tx: oneshot::Sender<usize>,
    },
    Shutdown,
}
