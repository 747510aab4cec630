//! Date and time-of-day dimensions keyed by derived numeric ids.

use chrono::{Datelike, Duration, NaiveDate};

use retailgen_core::{CalendarDate, EntityKind, TimeOfDay};

use crate::errors::GenerationError;
use crate::sampling::Stream;
use crate::session::{Entity, GenerationSession, Slot, Slots};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// `YYYYMMDD` key of `date`.
pub fn date_id(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// `HHMM` key of a minute of the day.
pub fn time_id(minute_of_day: u32) -> i64 {
    i64::from(minute_of_day / 60) * 100 + i64::from(minute_of_day % 60)
}

/// `days` consecutive dates starting at `start`.
pub fn generate_dates(start: NaiveDate, days: u32) -> Vec<CalendarDate> {
    let mut records = Vec::with_capacity(days as usize + 1);
    records.push(CalendarDate::unknown());

    for offset in 0..days {
        let date = start + Duration::days(i64::from(offset));
        records.push(CalendarDate {
            id: date_id(date),
            year: Some(date.year()),
            month: Some(date.month() as i32),
            day: Some(date.day() as i32),
            day_name: Some(date.format("%A").to_string()),
            month_name: Some(date.format("%B").to_string()),
        });
    }

    records
}

/// Every minute of one day.
pub fn generate_times() -> Vec<TimeOfDay> {
    let mut records = Vec::with_capacity(MINUTES_PER_DAY as usize + 1);
    records.push(TimeOfDay::unknown());

    for minute_of_day in 0..MINUTES_PER_DAY {
        let hour = minute_of_day / 60;
        let minute = minute_of_day % 60;
        let (twelve, meridiem) = match hour {
            0 => (12, "AM"),
            1..=11 => (hour, "AM"),
            12 => (12, "PM"),
            _ => (hour - 12, "PM"),
        };

        records.push(TimeOfDay {
            id: time_id(minute_of_day),
            hour: Some(hour as i32),
            minute: Some(minute as i32),
            twelve_hour: Some(format!("{twelve}:{minute:02} {meridiem}")),
            twenty_four_hour: Some(format!("{hour:02}:{minute:02}")),
        });
    }

    records
}

impl Entity for CalendarDate {
    const KIND: EntityKind = EntityKind::Dates;

    fn slot(slots: &mut Slots) -> &mut Slot<Self> {
        &mut slots.dates
    }

    fn generate(
        session: &mut GenerationSession,
        _rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError> {
        let settings = session.settings();
        Ok(generate_dates(settings.start_date, settings.days))
    }
}

impl Entity for TimeOfDay {
    const KIND: EntityKind = EntityKind::Times;

    fn slot(slots: &mut Slots) -> &mut Slot<Self> {
        &mut slots.times
    }

    fn generate(
        _session: &mut GenerationSession,
        _rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError> {
        Ok(generate_times())
    }
}
