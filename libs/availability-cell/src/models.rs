use std::fmt;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc};

use shared_models::booking::BookingStatus;

use crate::error::AvailabilityError;

pub const DAYS_PER_WEEK: u8 = 7;

/// Weekday index used throughout the dashboard: 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn weekday_name(weekday: u8) -> &'static str {
    match weekday {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Unknown",
    }
}

// ==============================================================================
// CLOCK TIMES
// ==============================================================================

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Wall-clock time of day in minutes since midnight, `00:00` through `24:00`.
///
/// `24:00` lets a day close at midnight, which `NaiveTime` cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const END_OF_DAY: ClockTime = ClockTime(MINUTES_PER_DAY);

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        let valid = (hour < 24 && minute < 60) || (hour == 24 && minute == 0);
        valid.then(|| ClockTime(hour * 60 + minute))
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Accepts `"HH:MM"` and `"HH:MM:SS"`; seconds must be zero.
    pub fn parse(value: &str) -> Result<Self, String> {
        let mut parts = value.trim().split(':');
        let mut field = |name: &str| -> Result<Option<u16>, String> {
            parts.next()
                .map(|raw| raw.parse::<u16>().map_err(|_| format!("invalid {} in '{}'", name, value)))
                .transpose()
        };

        let hour = field("hour")?.ok_or_else(|| format!("missing hour in '{}'", value))?;
        let minute = field("minute")?.ok_or_else(|| format!("missing minute in '{}'", value))?;
        let second = field("second")?.unwrap_or(0);

        if parts.next().is_some() || second != 0 {
            return Err(format!("invalid time '{}'", value));
        }

        Self::from_hm(hour, minute).ok_or_else(|| format!("time '{}' is out of range", value))
    }

    /// The instant this time falls at on `date`, in UTC. `24:00` is the
    /// following midnight.
    pub fn on(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(NaiveTime::MIN).and_utc() + Duration::minutes(self.0 as i64)
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        ClockTime((time.hour() * 60 + time.minute()) as u16)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ClockTime::parse(&raw).map_err(D::Error::custom)
    }
}

// ==============================================================================
// WEEKLY AVAILABILITY
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub weekday: u8,
    pub enabled: bool,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl DayAvailability {
    pub fn new(weekday: u8, enabled: bool, start: ClockTime, end: ClockTime) -> Self {
        Self { weekday, enabled, start, end }
    }

    pub fn is_valid(&self) -> bool {
        !self.enabled || self.start < self.end
    }

    /// Whole hours whose top-of-hour falls inside `[start, end)`.
    pub fn open_hours(&self) -> Vec<u32> {
        if !self.enabled {
            return vec![];
        }

        (0..24u16)
            .filter(|hour| {
                let top = hour * 60;
                top >= self.start.minutes() && top < self.end.minutes()
            })
            .map(u32::from)
            .collect()
    }
}

/// The single stored representation of a provider's weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub provider_id: Uuid,
    pub days: Vec<DayAvailability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WeeklyAvailability {
    /// Monday to Friday open 09:00-17:00, weekend closed.
    pub fn default_for(provider_id: Uuid) -> Self {
        let open = ClockTime(9 * 60);
        let close = ClockTime(17 * 60);

        Self {
            provider_id,
            days: (0..DAYS_PER_WEEK)
                .map(|weekday| DayAvailability::new(weekday, (1..=5).contains(&weekday), open, close))
                .collect(),
            updated_at: None,
        }
    }

    pub fn all_disabled(provider_id: Uuid) -> Self {
        let mut weekly = Self::default_for(provider_id);
        for day in weekly.days.iter_mut() {
            day.enabled = false;
        }
        weekly
    }

    pub fn day(&self, weekday: u8) -> Option<&DayAvailability> {
        self.days.iter().find(|day| day.weekday == weekday)
    }

    /// Exactly one entry per weekday, and `start < end` on every enabled day.
    pub fn validate(&self) -> Result<(), AvailabilityError> {
        if self.days.len() != DAYS_PER_WEEK as usize {
            return Err(AvailabilityError::InvalidAvailabilityConfig(format!(
                "expected {} days, found {}", DAYS_PER_WEEK, self.days.len()
            )));
        }

        for weekday in 0..DAYS_PER_WEEK {
            let matching = self.days.iter().filter(|day| day.weekday == weekday).count();
            if matching != 1 {
                return Err(AvailabilityError::InvalidAvailabilityConfig(format!(
                    "{} must appear exactly once", weekday_name(weekday)
                )));
            }
        }

        if let Some(day) = self.days.iter().find(|day| !day.is_valid()) {
            return Err(AvailabilityError::InvalidAvailabilityConfig(format!(
                "{} starts at {} but ends at {}",
                weekday_name(day.weekday),
                day.start,
                day.end
            )));
        }

        Ok(())
    }

    pub fn sorted(mut self) -> Self {
        self.days.sort_by_key(|day| day.weekday);
        self
    }

    pub fn available_weekdays(&self) -> Vec<u8> {
        let mut weekdays: Vec<u8> = self.days.iter()
            .filter(|day| day.enabled)
            .map(|day| day.weekday)
            .collect();
        weekdays.sort_unstable();
        weekdays
    }

    pub fn available_hours(&self, weekday: u8) -> Vec<u32> {
        self.day(weekday).map(DayAvailability::open_hours).unwrap_or_default()
    }

    /// Flattened per-day view for the dashboard, derived on read.
    pub fn weekday_summaries(&self) -> Vec<WeekdaySummary> {
        (0..DAYS_PER_WEEK)
            .map(|weekday| WeekdaySummary {
                weekday,
                name: weekday_name(weekday),
                enabled: self.day(weekday).is_some_and(|day| day.enabled),
                hours: self.available_hours(weekday),
            })
            .collect()
    }

    /// Returns a copy with one weekday changed. The original is left untouched.
    pub fn apply_patch(&self, weekday: u8, patch: &AvailabilityPatch) -> Result<Self, AvailabilityError> {
        if weekday >= DAYS_PER_WEEK {
            return Err(AvailabilityError::InvalidAvailabilityConfig(format!(
                "weekday must be between 0 (Sunday) and 6 (Saturday), got {}", weekday
            )));
        }

        let mut updated = self.clone();
        let day = updated.days.iter_mut()
            .find(|day| day.weekday == weekday)
            .ok_or_else(|| AvailabilityError::InvalidAvailabilityConfig(format!(
                "no entry for {}", weekday_name(weekday)
            )))?;

        if let Some(enabled) = patch.enabled {
            day.enabled = enabled;
        }
        if let Some(start) = patch.start {
            day.start = start;
        }
        if let Some(end) = patch.end {
            day.end = end;
        }

        updated.validate()?;
        Ok(updated)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityPatch {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub start: Option<ClockTime>,
    #[serde(default)]
    pub end: Option<ClockTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceAvailabilityRequest {
    pub days: Vec<DayAvailability>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekdaySummary {
    pub weekday: u8,
    pub name: &'static str,
    pub enabled: bool,
    pub hours: Vec<u32>,
}

// ==============================================================================
// SLOTS AND BOOKINGS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i32,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, duration_minutes: i32) -> Self {
        Self {
            start,
            end: start + Duration::minutes(duration_minutes as i64),
            duration_minutes,
        }
    }

    pub fn label(&self) -> String {
        self.start.format("%H:%M").to_string()
    }
}

/// The part of an existing booking the resolver needs for conflict checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedInterval {
    pub start: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: BookingStatus,
}

impl BookedInterval {
    pub fn new(start: DateTime<Utc>, duration_minutes: i32, status: BookingStatus) -> Self {
        Self { start, duration_minutes, status }
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(self.duration_minutes as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequest {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub service_id: Uuid,
    pub duration_minutes: i32,
}

impl SlotRequest {
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.date.and_time(self.time).and_utc()
    }
}

/// `"HH:MM"` on the wire; `"HH:MM:SS"` is also accepted when reading.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn parse(value: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(value, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|e| D::Error::custom(format!("invalid time '{}': {}", raw, e)))
    }
}
