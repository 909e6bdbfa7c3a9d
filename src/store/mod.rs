use crate::{
    error::StoreError,
    order::{Order, id::UserId},
};

/// In-memory [`OrderStore`] for tests and demos.
pub mod memory;

/// Durable JSON-file [`OrderStore`].
pub mod file;

/// Persistence collaborator for one user's order set.
///
/// Implementations must make each `save` an atomic read-modify-write of the user's key: the
/// manager relies on save-then-commit semantics to guarantee no partial order updates are ever
/// observable (a failed `save` rolls the mutation back).
pub trait OrderStore: Send + Sync {
    /// Load the full order set persisted for the provided user, empty if none.
    fn load(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    /// Atomically replace the full order set persisted for the provided user.
    fn save(
        &self,
        user: &UserId,
        orders: &[Order],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
