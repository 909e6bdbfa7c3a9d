use crate::{
    error::OrderError,
    order::{ActivitySnapshot, Participant},
};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// Request to create a new [`Order`](super::Order) for one activity occurrence.
///
/// The activity details are snapshotted into the order as-is; the referenced activity may
/// change afterwards without affecting it.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize, Constructor)]
pub struct CreateOrder {
    pub activity: ActivitySnapshot,
    pub participant: Participant,
}

impl CreateOrder {
    /// Validate required participant fields (name and phone must be non-empty).
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.participant.name.trim().is_empty() {
            return Err(OrderError::Validation(
                "participant name is required".to_string(),
            ));
        }

        if self.participant.phone.trim().is_empty() {
            return Err(OrderError::Validation(
                "participant phone is required".to_string(),
            ));
        }

        Ok(())
    }
}
