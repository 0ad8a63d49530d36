use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::{DomainError, MedicationId, ReminderId, UserId};

/// Wall-clock time of day a reminder fires, parsed from `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReminderTime {
    hour: u8,
    minute: u8,
}

impl ReminderTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, DomainError> {
        if hour > 23 || minute > 59 {
            return Err(DomainError::Validation(format!(
                "Invalid reminder time {}:{:02}",
                hour, minute
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    fn as_naive(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for ReminderTime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| DomainError::InvalidInput(format!("Expected HH:MM, got '{}'", s)))?;

        let hour: u8 = hour
            .parse()
            .map_err(|_| DomainError::InvalidInput(format!("Invalid hour in '{}'", s)))?;
        let minute: u8 = minute
            .parse()
            .map_err(|_| DomainError::InvalidInput(format!("Invalid minute in '{}'", s)))?;

        Self::new(hour, minute)
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Medication attached to a reminder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRef {
    pub id: MedicationId,
    pub name: String,
}

impl MedicationRef {
    pub fn new(id: MedicationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn parse_weekday(name: &str) -> Result<Weekday, DomainError> {
    name.trim()
        .parse::<Weekday>()
        .map_err(|_| DomainError::InvalidInput(format!("Unknown weekday: {}", name)))
}

/// Reminder aggregate root: a recurring weekly schedule for one or more
/// medications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    id: ReminderId,
    user_id: UserId,
    name: String,
    time: ReminderTime,
    days: Vec<Weekday>,
    medications: Vec<MedicationRef>,
    taking_medication: bool,
    created_at: DateTime<Utc>,
}

impl Reminder {
    pub fn new(
        user_id: UserId,
        name: String,
        time: ReminderTime,
        days: Vec<Weekday>,
        medications: Vec<MedicationRef>,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Reminder name cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: ReminderId::new(),
            user_id,
            name,
            time,
            days: normalize_days(days),
            medications,
            taking_medication: true,
            created_at: Utc::now(),
        })
    }

    /// Reconstruct from persistence
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ReminderId,
        user_id: UserId,
        name: String,
        time: ReminderTime,
        days: Vec<Weekday>,
        medications: Vec<MedicationRef>,
        taking_medication: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            time,
            days: normalize_days(days),
            medications,
            taking_medication,
            created_at,
        }
    }

    pub fn id(&self) -> &ReminderId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time(&self) -> ReminderTime {
        self.time
    }

    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    pub fn medications(&self) -> &[MedicationRef] {
        &self.medications
    }

    pub fn is_taking_medication(&self) -> bool {
        self.taking_medication
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_taking_medication(&mut self, taking: bool) {
        self.taking_medication = taking;
    }

    pub fn is_active(&self) -> bool {
        self.taking_medication && !self.days.is_empty()
    }

    pub fn is_scheduled_on(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    /// First firing strictly after `after`, in `after`'s offset.
    pub fn next_occurrence(&self, after: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        if !self.is_active() {
            return None;
        }

        let offset = *after.offset();
        let start = after.date_naive();

        (0..=7).find_map(|delta| {
            let date = start + Duration::days(delta);
            if !self.is_scheduled_on(date.weekday()) {
                return None;
            }
            let candidate = offset
                .from_local_datetime(&date.and_time(self.time.as_naive()))
                .single()?;
            (candidate > after).then_some(candidate)
        })
    }

    pub fn occurrence_at(&self, scheduled_for: DateTime<Utc>) -> ReminderOccurrence {
        ReminderOccurrence {
            reminder_id: self.id.clone(),
            reminder_name: self.name.clone(),
            user_id: self.user_id.clone(),
            scheduled_for,
            medications: self.medications.clone(),
        }
    }
}

fn normalize_days(mut days: Vec<Weekday>) -> Vec<Weekday> {
    days.sort_by_key(|d| d.num_days_from_monday());
    days.dedup();
    days
}

/// One firing of a reminder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOccurrence {
    pub reminder_id: ReminderId,
    pub reminder_name: String,
    pub user_id: UserId,
    pub scheduled_for: DateTime<Utc>,
    pub medications: Vec<MedicationRef>,
}
