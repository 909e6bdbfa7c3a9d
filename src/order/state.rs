use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Closed set of `Order` lifecycle states.
///
/// Permitted transitions:
/// `Pending -> {Paid, Cancelled}`, `Paid -> {Completed, Cancelled}`.
///
/// `Completed` and `Cancelled` are terminal. The status of an
/// [`Order`](super::Order) is never written directly - only via the transition
/// methods, which consult [`Self::can_transition`].
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Is this a terminal state (no further transitions permitted)?
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Is the transition from `self` to `next` in the permitted set?
    pub fn can_transition(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid)
                | (Self::Pending, Self::Cancelled)
                | (Self::Paid, Self::Completed)
                | (Self::Paid, Self::Cancelled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_transition_table() {
        use OrderStatus::*;

        struct TestCase {
            name: &'static str,
            from: OrderStatus,
            to: OrderStatus,
            expected: bool,
        }

        let cases = vec![
            TestCase {
                name: "pending to paid",
                from: Pending,
                to: Paid,
                expected: true,
            },
            TestCase {
                name: "pending to cancelled",
                from: Pending,
                to: Cancelled,
                expected: true,
            },
            TestCase {
                name: "pending to completed skips payment",
                from: Pending,
                to: Completed,
                expected: false,
            },
            TestCase {
                name: "paid to completed",
                from: Paid,
                to: Completed,
                expected: true,
            },
            TestCase {
                name: "paid to cancelled",
                from: Paid,
                to: Cancelled,
                expected: true,
            },
            TestCase {
                name: "paid back to pending",
                from: Paid,
                to: Pending,
                expected: false,
            },
            TestCase {
                name: "completed is terminal",
                from: Completed,
                to: Cancelled,
                expected: false,
            },
            TestCase {
                name: "cancelled is terminal",
                from: Cancelled,
                to: Paid,
                expected: false,
            },
            TestCase {
                name: "no self transition",
                from: Paid,
                to: Paid,
                expected: false,
            },
        ];

        for (index, test) in cases.iter().enumerate() {
            assert_eq!(
                test.from.can_transition(test.to),
                test.expected,
                "TC{} ({}) failed",
                index,
                test.name
            );
        }
    }

    #[test]
    fn test_order_status_terminal_set() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }
}
