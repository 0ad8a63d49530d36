//! Line-oriented JSON protocol read from stdin. Each line is one request;
//! replies are written back as one JSON line.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::presentation::state::AppState;
use medisort_domain::adherence::{AdherenceBroadcast, ADHERENCE_BROADCAST_ACTION};
use medisort_domain::reminder::{
    parse_weekday, MedicationRef, Reminder, ReminderIntent, MARK_AS_TAKEN_ACTION, SNOOZE_ACTION,
};
use medisort_domain::shared::{DomainError, MedicationId, ReminderId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MedicationInput {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReminderInput {
    #[serde(default)]
    pub reminder_id: Option<String>,
    pub name: String,
    /// `HH:MM`
    pub time: String,
    /// Weekday names, e.g. `["Monday", "Thursday"]`
    pub days: Vec<String>,
    #[serde(default)]
    pub medications: Vec<MedicationInput>,
    #[serde(default = "default_taking")]
    pub taking_medication: bool,
}

fn default_taking() -> bool {
    true
}

/// Requests that are not notification intents
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
enum ControlRequest {
    SwitchUser {
        #[serde(default)]
        user_id: Option<String>,
    },
    GetStreak,
    GetCalendar {
        year: i32,
        month: u32,
    },
    GetRecords {
        year: i32,
        month: u32,
    },
    SaveReminder(ReminderInput),
    DeleteReminder {
        reminder_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcRequest {
    /// Adherence broadcast, fed to the bridge
    Adherence(AdherenceBroadcast),
    /// Notification fire / snooze / mark-taken
    Reminder(ReminderIntent),
    SwitchUser(Option<UserId>),
    Streak,
    Calendar { year: i32, month: u32 },
    Records { year: i32, month: u32 },
    SaveReminder(ReminderInput),
    DeleteReminder(ReminderId),
}

#[derive(Debug, Serialize)]
struct ErrorReply<'a> {
    error: &'a str,
    code: u16,
}

pub fn parse_line(line: &str) -> Result<IpcRequest, DomainError> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| DomainError::Serialization(format!("Invalid request: {}", e)))?;

    let action = value.get("action").and_then(Value::as_str);
    match action {
        Some(ADHERENCE_BROADCAST_ACTION) => serde_json::from_value(value)
            .map(IpcRequest::Adherence)
            .map_err(|e| DomainError::Serialization(format!("Invalid adherence broadcast: {}", e))),
        None | Some(SNOOZE_ACTION) | Some(MARK_AS_TAKEN_ACTION) => serde_json::from_value(value)
            .map(IpcRequest::Reminder)
            .map_err(|e| DomainError::Serialization(format!("Invalid reminder intent: {}", e))),
        Some(_) => {
            let control: ControlRequest = serde_json::from_value(value)
                .map_err(|e| DomainError::InvalidInput(format!("Unknown request: {}", e)))?;
            Ok(match control {
                ControlRequest::SwitchUser { user_id } => IpcRequest::SwitchUser(
                    user_id
                        .filter(|id| !id.trim().is_empty())
                        .map(|id| UserId::from_string(id.trim())),
                ),
                ControlRequest::GetStreak => IpcRequest::Streak,
                ControlRequest::GetCalendar { year, month } => IpcRequest::Calendar { year, month },
                ControlRequest::GetRecords { year, month } => IpcRequest::Records { year, month },
                ControlRequest::SaveReminder(input) => IpcRequest::SaveReminder(input),
                ControlRequest::DeleteReminder { reminder_id } => {
                    IpcRequest::DeleteReminder(ReminderId::from_string(&reminder_id))
                }
            })
        }
    }
}

/// Execute a request. Fire-and-forget requests reply with `None`.
pub async fn dispatch(state: &AppState, request: IpcRequest) -> Result<Option<Value>, DomainError> {
    debug!("Dispatching {:?}", request);

    match request {
        IpcRequest::Adherence(broadcast) => {
            state.runtime.bridge.send(broadcast)?;
            Ok(None)
        }
        IpcRequest::Reminder(intent) => {
            state.services.reminder_actions.handle(intent).await?;
            Ok(None)
        }
        IpcRequest::SwitchUser(user) => {
            state.switch_user(user).await?;
            Ok(None)
        }
        IpcRequest::Streak => {
            let user = state.services.session.require_user().await?;
            let streak = state.queries.adherence.streak(&user).await?;
            to_reply(&streak)
        }
        IpcRequest::Calendar { year, month } => {
            let user = state.services.session.require_user().await?;
            let calendar = state.queries.adherence.calendar(&user, year, month).await?;
            to_reply(&calendar)
        }
        IpcRequest::Records { year, month } => {
            let user = state.services.session.require_user().await?;
            let records = state
                .queries
                .adherence
                .month_records(&user, year, month)
                .await?;
            to_reply(&records)
        }
        IpcRequest::SaveReminder(input) => {
            let user = state.services.session.require_user().await?;
            let reminder = build_reminder(state, user, input).await?;
            state.repositories.reminder.save(&reminder).await?;
            let scheduled = state.services.scheduler.schedule(reminder.clone()).await;
            info!(
                "Saved reminder '{}' ({}), scheduled: {}",
                reminder.name(),
                reminder.id(),
                scheduled
            );
            Ok(Some(serde_json::json!({
                "reminder_id": reminder.id().as_str(),
                "scheduled": scheduled,
            })))
        }
        IpcRequest::DeleteReminder(reminder_id) => {
            let user = state.services.session.require_user().await?;
            if owned_reminder(state, &user, &reminder_id).await?.is_none() {
                return Err(DomainError::ReminderNotFound(reminder_id.to_string()));
            }
            state.repositories.reminder.delete(&reminder_id).await?;
            state.services.scheduler.unschedule(&reminder_id).await;
            Ok(None)
        }
    }
}

/// JSON line describing a failed request
pub fn error_reply(error: &DomainError) -> String {
    let message = error.to_string();
    serde_json::to_string(&ErrorReply {
        error: &message,
        code: error.code().code(),
    })
    .unwrap_or_else(|_| format!("{{\"error\":{:?}}}", message))
}

fn to_reply<T: Serialize>(value: &T) -> Result<Option<Value>, DomainError> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(|e| DomainError::Serialization(e.to_string()))
}

/// The stored reminder if it belongs to `user`. Another user's reminder is
/// reported as not found.
async fn owned_reminder(
    state: &AppState,
    user: &UserId,
    id: &ReminderId,
) -> Result<Option<Reminder>, DomainError> {
    match state.repositories.reminder.find_by_id(id).await? {
        Some(existing) if existing.user_id() != user => {
            Err(DomainError::ReminderNotFound(id.to_string()))
        }
        found => Ok(found),
    }
}

async fn build_reminder(
    state: &AppState,
    user: UserId,
    input: ReminderInput,
) -> Result<Reminder, DomainError> {
    let days = input
        .days
        .iter()
        .map(|d| parse_weekday(d))
        .collect::<Result<Vec<Weekday>, _>>()?;
    let medications = input
        .medications
        .into_iter()
        .map(|m| MedicationRef::new(MedicationId::from_string(&m.id), m.name))
        .collect();

    let mut reminder = Reminder::new(user, input.name, input.time.parse()?, days, medications)?;
    reminder.set_taking_medication(input.taking_medication);

    let Some(id) = input.reminder_id.filter(|id| !id.trim().is_empty()) else {
        return Ok(reminder);
    };

    let id = ReminderId::from_string(&id);
    let created_at = match owned_reminder(state, reminder.user_id(), &id).await? {
        Some(existing) => existing.created_at(),
        None => reminder.created_at(),
    };

    Ok(Reminder::restore(
        id,
        reminder.user_id().clone(),
        reminder.name().to_string(),
        reminder.time(),
        reminder.days().to_vec(),
        reminder.medications().to_vec(),
        reminder.is_taking_medication(),
        created_at,
    ))
}
