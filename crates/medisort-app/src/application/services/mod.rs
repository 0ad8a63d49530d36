mod adherence_service;
mod broadcast_receiver;
mod reminder_actions;
mod reminder_scheduler;
mod session;

pub use adherence_service::AdherenceService;
pub use broadcast_receiver::{AdherenceBroadcastReceiver, BroadcastSender};
pub use reminder_actions::ReminderActionHandler;
pub use reminder_scheduler::ReminderScheduler;
pub use session::UserSession;
