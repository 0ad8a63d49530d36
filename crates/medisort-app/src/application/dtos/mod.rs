mod adherence_dto;
mod streak_dto;

pub use adherence_dto::{AdherenceCalendarDto, AdherenceRecordDto, CalendarDayDto, MonthStatsDto};
pub use streak_dto::StreakDto;
