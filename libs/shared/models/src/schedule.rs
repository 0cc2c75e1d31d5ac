use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Half-open interval overlap: `[a, b)` and `[c, d)` overlap iff `a < d && c < b`.
pub fn ranges_overlap<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub specialty: String,
    pub bio: Option<String>,
    pub contact: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub age: Option<u32>,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The two window shapes share one record; everything that needs "does this
/// interval fit" goes through [`AvailabilityWindow::contains`] instead of
/// branching on the shape at each call site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WindowSchedule {
    Recurring { weekday: Weekday },
    Dated { date: NaiveDate, slot_minutes: i64 },
}

/// Grouping key used for the non-overlap invariant: two windows can only
/// conflict when they share a day key (and therefore a shape).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayKey {
    Weekday(Weekday),
    Date(NaiveDate),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(flatten)]
    pub schedule: WindowSchedule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AvailabilityWindow {
    pub fn day_key(&self) -> DayKey {
        match self.schedule {
            WindowSchedule::Recurring { weekday } => DayKey::Weekday(weekday),
            WindowSchedule::Dated { date, .. } => DayKey::Date(date),
        }
    }

    pub fn covers_date(&self, date: NaiveDate) -> bool {
        match self.schedule {
            WindowSchedule::Recurring { weekday } => date.weekday() == weekday,
            WindowSchedule::Dated { date: window_date, .. } => date == window_date,
        }
    }

    /// Slot size for this window. Recurring windows carry no size of their
    /// own and fall back to the configured default.
    pub fn slot_minutes(&self, default_minutes: i64) -> i64 {
        match self.schedule {
            WindowSchedule::Recurring { .. } => default_minutes,
            WindowSchedule::Dated { slot_minutes, .. } => slot_minutes,
        }
    }

    /// Whether `[start, end)` lies fully inside this window on the day the
    /// appointment starts. Time-of-day comparison only; the caller has
    /// already established `start < end`.
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.covers_date(start.date_naive())
            && start.time() >= self.start_time
            && end.time() <= self.end_time
    }

    pub fn overlaps(&self, other: &AvailabilityWindow) -> bool {
        self.day_key() == other.day_key()
            && ranges_overlap(self.start_time, self.end_time, other.start_time, other.end_time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }

    pub fn overlaps_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        ranges_overlap(self.start_time, self.end_time, start, end)
    }
}

/// Derived bookable sub-interval of a window. Never persisted; recomputed on
/// demand from the owning window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
