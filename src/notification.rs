use crate::order::id::OrderId;
use chrono::{DateTime, TimeDelta, Utc};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, ToSmolStr};
use std::collections::VecDeque;

#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display, From,
)]
pub struct NotificationId(pub SmolStr);

/// Severity of a [`Notification`], mapped by consumers onto display styling.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Ephemeral record of an order status change or system event, for user-facing display.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub time: DateTime<Utc>,
    pub order: Option<OrderId>,
}

/// Insertion-ordered bounded buffer of [`Notification`]s.
///
/// Oldest entries are evicted once `capacity` is reached. `Info` notifications additionally
/// self-expire once older than `info_ttl` (pruned on each scanner tick).
#[derive(Debug, Clone)]
pub struct NotificationBuffer {
    capacity: usize,
    info_ttl: TimeDelta,
    sequence: u64,
    buffer: VecDeque<Notification>,
}

impl NotificationBuffer {
    pub fn new(capacity: usize, info_ttl: TimeDelta) -> Self {
        Self {
            capacity,
            info_ttl,
            sequence: 0,
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a new [`Notification`], evicting the oldest entry if the buffer is full.
    pub fn push(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        time: DateTime<Utc>,
        order: Option<OrderId>,
    ) -> Notification {
        let notification = Notification {
            id: self.id_sequence_fetch_add(),
            kind,
            title: title.into(),
            message: message.into(),
            time,
            order,
        };

        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(notification.clone());

        notification
    }

    /// Current notifications, oldest first.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Remove the [`Notification`] with the provided id, returning whether it was present.
    pub fn dismiss(&mut self, id: &NotificationId) -> bool {
        let len_before = self.buffer.len();
        self.buffer.retain(|notification| notification.id != *id);
        self.buffer.len() != len_before
    }

    /// Remove all [`Notification`]s, returning how many were dismissed.
    pub fn dismiss_all(&mut self) -> usize {
        let len_before = self.buffer.len();
        self.buffer.clear();
        len_before
    }

    /// Remove `Info` notifications older than the configured TTL, returning how many expired.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let len_before = self.buffer.len();
        let info_ttl = self.info_ttl;
        self.buffer.retain(|notification| {
            notification.kind != NotificationKind::Info || now - notification.time < info_ttl
        });
        len_before - self.buffer.len()
    }

    fn id_sequence_fetch_add(&mut self) -> NotificationId {
        let sequence = self.sequence;
        self.sequence += 1;
        NotificationId(sequence.to_smolstr())
    }
}
