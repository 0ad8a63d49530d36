use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};

use medisort_domain::shared::{day_bounds, DomainError};

/// First and last local day of a month
pub(super) fn month_days(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), DomainError> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::Validation(format!("Invalid month: {}", month)));
    }

    let first_day = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::Validation(format!("Invalid year: {}", year)))?;
    let first_day_next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last_day = first_day_next_month
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| DomainError::Validation(format!("Invalid year: {}", year)))?;

    Ok((first_day, last_day))
}

/// Half-open UTC range covering the whole local month
pub(super) fn month_bounds(
    year: i32,
    month: u32,
    offset: FixedOffset,
) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
    let (first_day, last_day) = month_days(year, month)?;
    let (start, _) = day_bounds(first_day, offset);
    let (_, end) = day_bounds(last_day, offset);
    Ok((start, end))
}

pub(super) fn days_of(first_day: NaiveDate, last_day: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    (first_day.day()..=last_day.day())
        .filter_map(move |d| NaiveDate::from_ymd_opt(first_day.year(), first_day.month(), d))
}
