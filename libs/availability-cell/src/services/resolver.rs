use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

use crate::error::AvailabilityError;
use crate::models::{
    weekday_index, weekday_name, BookedInterval, SlotRequest, TimeSlot, WeeklyAvailability,
    MINUTES_PER_DAY,
};

pub const DEFAULT_GRANULARITY_MINUTES: i64 = 60;
pub const MAX_GRANULARITY_MINUTES: i64 = MINUTES_PER_DAY as i64;

/// Half-open overlap: `[a_start, a_end)` and `[b_start, b_end)` share time.
/// Touching endpoints do not overlap.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Derives bookable start times from a weekly schedule. Pure: every input,
/// including the current time, is passed in by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityResolver {
    granularity_minutes: i64,
}

impl Default for AvailabilityResolver {
    fn default() -> Self {
        Self { granularity_minutes: DEFAULT_GRANULARITY_MINUTES }
    }
}

impl AvailabilityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step between candidate start times, clamped to one minute..one day.
    pub fn with_granularity(minutes: i64) -> Self {
        Self { granularity_minutes: minutes.clamp(1, MAX_GRANULARITY_MINUTES) }
    }

    pub fn granularity_minutes(&self) -> i64 {
        self.granularity_minutes
    }

    /// Bookable slots on `date`, in chronological order.
    ///
    /// A disabled day yields an empty list. Slots that start at or before
    /// `now` are dropped, as are slots overlapping a non-cancelled booking.
    pub fn slots_for_date(
        &self,
        date: NaiveDate,
        weekly: &WeeklyAvailability,
        service_duration: i32,
        existing: &[BookedInterval],
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>, AvailabilityError> {
        if date < now.date_naive() {
            return Err(AvailabilityError::PastDateTime);
        }

        let slots: Vec<TimeSlot> = self.candidate_slots(date, weekly, service_duration)?
            .into_iter()
            .filter(|slot| slot.start > now)
            .filter(|slot| !conflicts_with(slot, existing))
            .collect();

        debug!("{} bookable slots on {} for a {} minute service", slots.len(), date, service_duration);
        Ok(slots)
    }

    /// Checks a proposed booking. Returns the slot it would occupy.
    ///
    /// This is a pre-check only; the booking store's uniqueness constraint
    /// remains the guard against two concurrent inserts for the same slot.
    pub fn validate_booking(
        &self,
        request: &SlotRequest,
        weekly: &WeeklyAvailability,
        existing: &[BookedInterval],
        now: DateTime<Utc>,
    ) -> Result<TimeSlot, AvailabilityError> {
        let starts_at = request.starts_at();
        debug!("Validating booking for service {} at {}", request.service_id, starts_at);

        if starts_at <= now {
            return Err(AvailabilityError::PastDateTime);
        }

        let slot = self.candidate_slots(request.date, weekly, request.duration_minutes)?
            .into_iter()
            .find(|slot| slot.start == starts_at)
            .ok_or(AvailabilityError::OutsideAvailability)?;

        if conflicts_with(&slot, existing) {
            return Err(AvailabilityError::DoubleBooked);
        }

        Ok(slot)
    }

    /// Every start time on the granularity grid whose service window ends by closing time.
    fn candidate_slots(
        &self,
        date: NaiveDate,
        weekly: &WeeklyAvailability,
        service_duration: i32,
    ) -> Result<Vec<TimeSlot>, AvailabilityError> {
        let weekday = weekday_index(date);
        let day = weekly.day(weekday).ok_or_else(|| {
            AvailabilityError::InvalidAvailabilityConfig(format!("no entry for {}", weekday_name(weekday)))
        })?;

        if !day.enabled {
            return Ok(vec![]);
        }

        if !day.is_valid() {
            return Err(AvailabilityError::InvalidAvailabilityConfig(format!(
                "{} opens at {} but closes at {}",
                weekday_name(weekday),
                day.start,
                day.end
            )));
        }

        if service_duration <= 0 {
            return Ok(vec![]);
        }

        let closes_at = day.end.on(date);
        let length = Duration::minutes(service_duration as i64);
        let step = Duration::minutes(self.granularity_minutes);

        let mut slots = Vec::new();
        let mut current = day.start.on(date);

        while current + length <= closes_at {
            slots.push(TimeSlot::new(current, service_duration));
            current += step;
        }

        Ok(slots)
    }
}

fn conflicts_with(slot: &TimeSlot, existing: &[BookedInterval]) -> bool {
    existing.iter()
        .filter(|booking| booking.status.blocks_slot())
        .any(|booking| intervals_overlap(slot.start, slot.end, booking.start, booking.end()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};
    use crate::models::ClockTime;
    use shared_models::booking::BookingStatus;
    use uuid::Uuid;

    // 2030-01-07 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
    }

    fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
        date.and_hms_opt(hour, minute, 0).unwrap().and_utc()
    }

    fn long_ago() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_overlap_is_half_open() {
        let d = monday();
        assert!(intervals_overlap(at(d, 10, 0), at(d, 11, 0), at(d, 10, 30), at(d, 11, 30)));
        assert!(!intervals_overlap(at(d, 10, 0), at(d, 11, 0), at(d, 11, 0), at(d, 12, 0)));
        assert!(!intervals_overlap(at(d, 11, 0), at(d, 12, 0), at(d, 10, 0), at(d, 11, 0)));
    }

    #[test]
    fn test_finer_granularity_yields_more_slots() {
        let weekly = WeeklyAvailability::default_for(Uuid::new_v4());
        let resolver = AvailabilityResolver::with_granularity(30);

        let slots = resolver.slots_for_date(monday(), &weekly, 60, &[], long_ago()).unwrap();
        assert_eq!(slots.len(), 15);
        assert_eq!(slots.last().unwrap().start, at(monday(), 16, 0));
    }

    #[test]
    fn test_granularity_is_clamped_to_one_day() {
        assert_eq!(AvailabilityResolver::with_granularity(0).granularity_minutes(), 1);
        assert_eq!(AvailabilityResolver::with_granularity(i64::MAX).granularity_minutes(), 1440);

        let weekly = WeeklyAvailability::default_for(Uuid::new_v4());
        let slots = AvailabilityResolver::with_granularity(i64::MAX)
            .slots_for_date(monday(), &weekly, 60, &[], long_ago())
            .unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, at(monday(), 9, 0));
    }

    #[test]
    fn test_today_drops_started_slots() {
        let weekly = WeeklyAvailability::default_for(Uuid::new_v4());
        let now = at(monday(), 12, 15);

        let slots = AvailabilityResolver::new()
            .slots_for_date(monday(), &weekly, 60, &[], now)
            .unwrap();
        let labels: Vec<String> = slots.iter().map(TimeSlot::label).collect();
        assert_eq!(labels, vec!["13:00", "14:00", "15:00", "16:00"]);
    }

    #[test]
    fn test_cancelled_booking_frees_its_slot() {
        let weekly = WeeklyAvailability::default_for(Uuid::new_v4());
        let existing = vec![BookedInterval::new(at(monday(), 10, 0), 60, BookingStatus::Cancelled)];

        let slots = AvailabilityResolver::new()
            .slots_for_date(monday(), &weekly, 60, &existing, long_ago())
            .unwrap();
        assert_eq!(slots.len(), 8);
    }

    #[test]
    fn test_overlapping_grid_slot_is_double_booked() {
        let weekly = WeeklyAvailability::default_for(Uuid::new_v4());
        let existing = vec![BookedInterval::new(at(monday(), 10, 0), 60, BookingStatus::Pending)];
        let request = SlotRequest {
            date: monday(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            service_id: Uuid::new_v4(),
            duration_minutes: 60,
        };

        let result = AvailabilityResolver::new().validate_booking(&request, &weekly, &existing, long_ago());
        assert_eq!(result, Err(AvailabilityError::DoubleBooked));
    }

    #[test]
    fn test_day_closing_at_midnight_offers_last_hour() {
        let mut weekly = WeeklyAvailability::default_for(Uuid::new_v4());
        weekly.days[1].start = ClockTime::from_hm(22, 0).unwrap();
        weekly.days[1].end = ClockTime::END_OF_DAY;

        let slots = AvailabilityResolver::new()
            .slots_for_date(monday(), &weekly, 60, &[], long_ago())
            .unwrap();
        let labels: Vec<String> = slots.iter().map(TimeSlot::label).collect();
        assert_eq!(labels, vec!["22:00", "23:00"]);
        assert_eq!(weekly.available_hours(1), vec![22, 23]);
        assert_eq!(slots[1].end, at(monday(), 0, 0) + Duration::days(1));

        let request = SlotRequest {
            date: monday(),
            time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            service_id: Uuid::new_v4(),
            duration_minutes: 60,
        };
        assert!(AvailabilityResolver::new().validate_booking(&request, &weekly, &[], long_ago()).is_ok());
    }

    #[test]
    fn test_inverted_hours_on_enabled_day_is_config_error() {
        let mut weekly = WeeklyAvailability::default_for(Uuid::new_v4());
        weekly.days[1].start = ClockTime::from_hm(17, 0).unwrap();
        weekly.days[1].end = ClockTime::from_hm(9, 0).unwrap();

        let result = AvailabilityResolver::new().slots_for_date(monday(), &weekly, 60, &[], long_ago());
        assert!(matches!(result, Err(AvailabilityError::InvalidAvailabilityConfig(_))));
    }
}
