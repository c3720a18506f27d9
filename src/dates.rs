//! Date-recency highlighting shared by order and inventory sheets.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};
use serde::Serialize;

use crate::render::page::Rgb;

/// Background classification of a date relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DateHighlight {
    #[default]
    None,
    /// Exactly one calendar day old.
    Yesterday,
    /// Two or more calendar days old.
    Older,
}

impl DateHighlight {
    /// Classifies `target` by the calendar-day difference `today - target`.
    pub fn classify(target: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(target) = target else {
            return Self::None;
        };
        match today.signed_duration_since(target).num_days() {
            1 => Self::Yesterday,
            d if d >= 2 => Self::Older,
            _ => Self::None,
        }
    }

    /// Parses `raw` and classifies it; unparsable input is never highlighted.
    pub fn classify_str(raw: &str, clock: &RenderClock) -> Self {
        Self::classify(parse_calendar_date(raw, clock.offset), clock.today)
    }

    /// Cell background, if any.
    pub fn background(self) -> Option<Rgb> {
        match self {
            Self::None => None,
            Self::Yesterday => Some(Rgb::YELLOW),
            Self::Older => Some(Rgb::RED),
        }
    }

    /// Text colour to use on top of [`Self::background`].
    pub fn foreground(self) -> Rgb {
        match self {
            Self::Older => Rgb::WHITE,
            _ => Rgb::BLACK,
        }
    }
}

/// "Today" plus the UTC offset used to turn timestamps into calendar days.
///
/// Layout code never reads the process timezone; callers construct this
/// explicitly (or via [`RenderClock::now`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderClock {
    pub today: NaiveDate,
    pub offset: FixedOffset,
}

impl RenderClock {
    pub fn new(today: NaiveDate, offset: FixedOffset) -> Self {
        Self { today, offset }
    }

    /// Local calendar day and offset at the moment of the call.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            today: now.date_naive(),
            offset: now.offset().fix(),
        }
    }

    /// Calendar day of `ts` in this clock's offset.
    pub fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    /// `ts` formatted as `dd.mm.yyyy HH:MM` in this clock's offset.
    pub fn format_timestamp(&self, ts: DateTime<Utc>) -> String {
        ts.with_timezone(&self.offset).format("%d.%m.%Y %H:%M").to_string()
    }
}

/// Parses `YYYY-MM-DD` dates and RFC 3339 timestamps.
pub fn parse_calendar_date(raw: &str, offset: FixedOffset) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| offset.from_utc_datetime(&ts.naive_utc()).date_naive())
}

/// Short `dd.mm` form used in dense grid cells.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%d.%m").to_string()
}
