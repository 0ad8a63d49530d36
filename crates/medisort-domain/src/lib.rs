// Domain layer - adherence rules, streak arithmetic and reminder schedules
// No dependencies on infrastructure or presentation layers

pub mod adherence;
pub mod events;
pub mod reminder;
pub mod shared;
pub mod streak;

pub use events::DomainEvent;
pub use shared::{DomainError, MedicationId, ReminderId, UserId};
