// Domain layer - Pure business logic
// No dependencies on infrastructure or application layers

pub mod events;
pub mod notification;
pub mod shared;
pub mod streak;
pub mod xp;

// Re-exports for convenience
pub use events::DomainEvent;
pub use shared::{DomainError, UserId};
