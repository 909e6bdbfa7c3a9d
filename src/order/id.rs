use derive_more::{Display, From};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display, From,
)]
pub struct OrderId(pub SmolStr);

impl OrderId {
    /// Construct an `OrderId` from the specified string.
    ///
    /// Use [`Self::random`] to generate a random stack-allocated `OrderId`.
    pub fn new<S: AsRef<str>>(id: S) -> Self {
        Self(SmolStr::new(id))
    }

    /// Construct a random stack-allocated `OrderId` backed by a 23 byte [`SmolStr`].
    pub fn random() -> Self {
        // SmolStr can be up to 23 bytes long without allocating
        const LEN_NON_ALLOCATING_ID: usize = 23;

        let mut thread_rng = rand::rng();

        let random_id: String = (&mut thread_rng)
            .sample_iter(rand::distr::Alphanumeric)
            .take(LEN_NON_ALLOCATING_ID)
            .map(char::from)
            .collect();

        Self(SmolStr::new_inline(&random_id))
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::random()
    }
}

#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display, From,
)]
pub struct UserId(pub SmolStr);

impl UserId {
    pub fn new<S: AsRef<str>>(id: S) -> Self {
        Self(SmolStr::new(id))
    }
}

#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display, From,
)]
pub struct ActivityId(pub SmolStr);

impl ActivityId {
    pub fn new<S: AsRef<str>>(id: S) -> Self {
        Self(SmolStr::new(id))
    }
}
