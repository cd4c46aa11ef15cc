use async_trait::async_trait;

use super::aggregate::StreakRecord;
use super::transition::Transition;
use super::value_objects::StreakKey;
use crate::shared::{DomainError, UserId};

/// Computes the next streak state from the record read inside the transaction
pub type TransitionFn<'a> = dyn Fn(Option<&StreakRecord>) -> Transition + Send + Sync + 'a;

/// Streak storage
///
/// `transact` is the only way to write a record. Implementations read the
/// current record, hand it to `compute`, and persist the result only if no
/// other writer committed in between. A lost race is reported as
/// `DomainError::Conflict`; nothing is written in that case.
#[async_trait]
pub trait StreakRepository: Send + Sync {
    async fn transact(
        &self,
        key: &StreakKey,
        compute: &TransitionFn<'_>,
    ) -> Result<Transition, DomainError>;

    async fn find(&self, key: &StreakKey) -> Result<Option<StreakRecord>, DomainError>;

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<StreakRecord>, DomainError>;
}

/// Per-user streak preferences
#[async_trait]
pub trait StreakPreferenceRepository: Send + Sync {
    /// Stored auto-freeze preference, `None` when the user never chose
    async fn auto_freeze_enabled(&self, user_id: &UserId) -> Result<Option<bool>, DomainError>;

    async fn set_auto_freeze(&self, user_id: &UserId, enabled: bool) -> Result<(), DomainError>;
}
