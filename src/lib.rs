#![warn(
    missing_debug_implementations,
    missing_copy_implementations,
    rust_2018_idioms,
    // missing_docs
)]
#![allow(clippy::type_complexity)]

//! # Booking-Orders
//! Order lifecycle engine for an activity booking platform. Owns the order set for one
//! authenticated user session, applies state transitions (create, pay, cancel, auto-expire,
//! auto-complete), and emits a notification on every transition.
//! **It is:**
//! * **Typed**: order status is a closed enum with an exhaustively checked transition table, so
//!   illegal states are unrepresentable.
//! * **Transactional**: every mutation is save-then-commit against the injected [`OrderStore`](store::OrderStore) -
//!   a failed persist rolls back to the last known-good in-memory state.
//! * **Deterministic**: the clock, persistence, and external payment channel are injectable
//!   collaborators, so the payment-deadline scanner can be driven in tests without wall time.
//!
//! Interact with a running session via its [`SessionHandle`](engine::session::SessionHandle).

/// Errors generated by order mutations and the persistence collaborator.
pub mod error;

/// Core data structures.
///
/// eg/ `Order`, `ActivitySnapshot`, `Participant`, `OrderStatus`, etc.
pub mod order;

/// User-facing notification records held in an insertion-ordered bounded buffer.
pub mod notification;

/// Persistence collaborator - [`OrderStore`](store::OrderStore) trait plus in-memory and
/// JSON-file implementations.
pub mod store;

/// Time source abstraction so the scanner can be driven deterministically in tests.
pub mod clock;

/// Pluggable external event source standing in for a payment backend push/poll channel.
pub mod event;

/// The [`OrderManager`](engine::OrderManager) core and its single-writer session runtime.
pub mod engine;

/// Tracing subscriber initialisation helpers.
pub mod logging;
