#[cfg(test)]
mod tests {
    use super::super::daily_status::*;
    use super::super::{AdherenceRecord, AdherenceStatus};
    use crate::shared::{MedicationId, ReminderId, UserId};
    use chrono::{Duration, TimeZone, Utc};

    fn rid(s: &str) -> ReminderId {
        ReminderId::from_string(s)
    }

    #[test]
    fn test_taken_on_first_notification() {
        let mut status = DailyReminderStatus::new();
        status.apply(&rid("morning"), AdherenceStatus::Taken);

        assert_eq!(status.first_try(&rid("morning")), Some(true));
        assert!(status.summary().all_on_time());
        assert_eq!(status.summary().outcome(), DayOutcome::AllOnTime);
    }

    #[test]
    fn test_snooze_then_taken_is_not_first_try() {
        let mut status = DailyReminderStatus::new();
        status.apply(&rid("morning"), AdherenceStatus::Snoozed);
        status.apply(&rid("morning"), AdherenceStatus::Taken);

        assert_eq!(status.first_try(&rid("morning")), Some(false));
        assert!(status.was_snoozed(&rid("morning")));
        assert!(!status.summary().all_on_time());
    }

    #[test]
    fn test_snooze_after_taken_flips_to_false() {
        let mut status = DailyReminderStatus::new();
        status.apply(&rid("evening"), AdherenceStatus::Taken);
        assert_eq!(status.first_try(&rid("evening")), Some(true));

        status.apply(&rid("evening"), AdherenceStatus::Snoozed);
        assert_eq!(status.first_try(&rid("evening")), Some(false));
        assert_eq!(status.summary().outcome(), DayOutcome::NotAllOnTime);
    }

    #[test]
    fn test_repeated_taken_is_idempotent() {
        let mut status = DailyReminderStatus::new();
        status.apply(&rid("noon"), AdherenceStatus::Taken);
        let before = status.clone();

        status.apply(&rid("noon"), AdherenceStatus::Taken);
        assert_eq!(status, before);
        assert_eq!(status.summary().tracked, 1);
    }

    #[test]
    fn test_missed_marks_not_first_try() {
        let mut status = DailyReminderStatus::new();
        status.apply(&rid("noon"), AdherenceStatus::Missed);
        status.apply(&rid("noon"), AdherenceStatus::Taken);

        assert_eq!(status.first_try(&rid("noon")), Some(false));
        assert!(!status.was_snoozed(&rid("noon")));
    }

    #[test]
    fn test_distinct_reminders_are_order_independent() {
        let events = [
            (rid("a"), AdherenceStatus::Taken),
            (rid("b"), AdherenceStatus::Snoozed),
            (rid("c"), AdherenceStatus::Missed),
            (rid("d"), AdherenceStatus::Taken),
        ];

        let mut forward = DailyReminderStatus::new();
        for (id, s) in events.iter() {
            forward.apply(id, *s);
        }

        let mut backward = DailyReminderStatus::new();
        for (id, s) in events.iter().rev() {
            backward.apply(id, *s);
        }

        assert_eq!(forward, backward);
        assert_eq!(
            forward.summary(),
            DaySummary {
                tracked: 4,
                taken_on_first_try: 2
            }
        );
    }

    #[test]
    fn test_empty_day_never_qualifies() {
        let status = DailyReminderStatus::new();
        assert_eq!(status.summary().outcome(), DayOutcome::Pending);
        assert!(!status.summary().all_on_time());
    }

    #[test]
    fn test_replay_uses_taken_at_order() {
        let user = UserId::new();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let record = |status, offset_minutes| {
            AdherenceRecord::new(
                rid("morning"),
                MedicationId::new(),
                "Metformin".to_string(),
                user.clone(),
                status,
                base,
                base + Duration::minutes(offset_minutes),
            )
            .unwrap()
        };

        // Stored out of order: the snooze happened first.
        let records = vec![
            record(AdherenceStatus::Taken, 10),
            record(AdherenceStatus::Snoozed, 1),
        ];

        let status = DailyReminderStatus::replay(&records);
        assert_eq!(status.first_try(&rid("morning")), Some(false));
    }
}
