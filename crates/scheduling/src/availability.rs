//! Availability calculation
//!
//! Pure function over two independently sourced snapshots: the
//! professional's normalized weekly schedule and the bookings already on
//! the calendar. Slot granularity is the whole hour; a booking blocks a
//! slot when it starts anywhere inside that hour on the same local day.

use chrono::{DateTime, NaiveDate, Timelike, Utc};

use clinic_agent_core::{OperatingSchedule, Slot};

/// Start/end of an existing booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookedSpan {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// Compute open slots for one professional on one date
///
/// - An inactive day yields no slots, whatever the bookings say.
/// - Slot bounds come from the day's start/end truncated to whole hours;
///   an 18:30 close still puts the last slot at 17:00.
/// - A slot is taken when any booking dated the same local day starts in
///   that hour. Bookings on other days, or outside `[start, end)`, never
///   affect the result.
/// - Returned in ascending hour order.
pub fn compute_slots(
    schedule: &OperatingSchedule,
    date: NaiveDate,
    existing: &[BookedSpan],
) -> Vec<Slot> {
    let day = schedule.for_date(date);
    if !day.active {
        return Vec::new();
    }

    let (start_hour, end_hour) = day.hour_bounds();

    (start_hour..end_hour)
        .filter(|&hour| {
            !existing.iter().any(|booking| {
                booking.start.date_naive() == date && booking.start.hour() == hour
            })
        })
        .map(Slot::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};
    use clinic_agent_core::DayHours;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn week_with(day_index: usize, hours: DayHours) -> OperatingSchedule {
        let mut week = OperatingSchedule::closed();
        week.0[day_index] = hours;
        week
    }

    fn booking_at(date: NaiveDate, hour: u32, minute: u32) -> BookedSpan {
        let start = Utc
            .from_utc_datetime(&date.and_hms_opt(hour, minute, 0).unwrap());
        BookedSpan::new(start, start + chrono::Duration::hours(1))
    }

    fn rendered(slots: &[Slot]) -> Vec<String> {
        slots.iter().map(|s| s.to_string()).collect()
    }

    // 2026-03-02 is a Monday (weekday index 1, Sunday = 0)
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn test_inactive_day_yields_nothing() {
        let week = week_with(1, DayHours::closed());
        let booked = vec![booking_at(monday(), 10, 0)];
        assert!(compute_slots(&week, monday(), &booked).is_empty());
    }

    #[test]
    fn test_open_day_no_bookings() {
        let week = week_with(1, DayHours::open(t(9, 0), t(12, 0)));
        let slots = compute_slots(&week, monday(), &[]);
        assert_eq!(rendered(&slots), vec!["09:00", "10:00", "11:00"]);
    }

    #[test]
    fn test_booking_blocks_only_its_hour() {
        let week = week_with(1, DayHours::open(t(9, 0), t(12, 0)));
        let booked = vec![booking_at(monday(), 10, 0)];
        let slots = compute_slots(&week, monday(), &booked);
        assert_eq!(rendered(&slots), vec!["09:00", "11:00"]);
    }

    #[test]
    fn test_mid_hour_booking_blocks_hour_bucket() {
        let week = week_with(1, DayHours::open(t(9, 0), t(12, 0)));
        let booked = vec![booking_at(monday(), 10, 30)];
        let slots = compute_slots(&week, monday(), &booked);
        assert_eq!(rendered(&slots), vec!["09:00", "11:00"]);
    }

    #[test]
    fn test_zero_width_day_yields_nothing() {
        let week = week_with(1, DayHours::open(t(9, 0), t(9, 0)));
        assert!(compute_slots(&week, monday(), &[]).is_empty());
    }

    #[test]
    fn test_half_hour_close_truncated() {
        let week = week_with(1, DayHours::open(t(9, 0), t(18, 30)));
        let slots = compute_slots(&week, monday(), &[]);
        assert_eq!(slots.first().map(|s| s.hour), Some(9));
        // Last slot starts 17:00, not 18:00
        assert_eq!(slots.last().map(|s| s.hour), Some(17));
        assert_eq!(slots.len(), 9);
    }

    #[test]
    fn test_other_day_bookings_ignored() {
        let week = week_with(1, DayHours::open(t(9, 0), t(12, 0)));
        let tuesday = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        let booked = vec![booking_at(tuesday, 10, 0)];
        let slots = compute_slots(&week, monday(), &booked);
        assert_eq!(rendered(&slots), vec!["09:00", "10:00", "11:00"]);
    }

    #[test]
    fn test_out_of_window_bookings_never_add_slots() {
        let week = week_with(1, DayHours::open(t(9, 0), t(11, 0)));
        let booked = vec![booking_at(monday(), 7, 0), booking_at(monday(), 15, 0)];
        let slots = compute_slots(&week, monday(), &booked);
        assert_eq!(rendered(&slots), vec!["09:00", "10:00"]);
    }

    #[test]
    fn test_weekday_scenario() {
        // Monday 09:00-11:00 active, Tuesday inactive
        let week = week_with(1, DayHours::open(t(9, 0), t(11, 0)));
        let tuesday = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        assert!(compute_slots(&week, tuesday, &[]).is_empty());

        let booked = vec![booking_at(monday(), 9, 0)];
        let slots = compute_slots(&week, monday(), &booked);
        assert_eq!(rendered(&slots), vec!["10:00"]);
    }

    #[test]
    fn test_ascending_order() {
        let week = week_with(1, DayHours::open(t(8, 0), t(18, 0)));
        let slots = compute_slots(&week, monday(), &[]);
        let mut sorted = slots.clone();
        sorted.sort();
        assert_eq!(slots, sorted);
    }
}
