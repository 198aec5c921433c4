use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Fournit le calendrier d'un mois : nombre de jours, week-ends, jours fériés.
pub trait CalendarProvider {
    fn days_in_month(&self, year: i32, month: u32) -> Result<u32, CalendarError>;
    fn is_weekend(&self, year: i32, month: u32, day: u32) -> bool;
    fn is_holiday(&self, year: i32, month: u32, day: u32) -> bool;

    fn is_non_working_day(&self, year: i32, month: u32, day: u32) -> bool {
        self.is_weekend(year, month, day) || self.is_holiday(year, month, day)
    }
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, CalendarError> {
    let invalid = || CalendarError::InvalidMonth { year, month };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    u32::try_from(next.signed_duration_since(first).num_days()).map_err(|_| invalid())
}

pub fn weekday(year: i32, month: u32, day: u32) -> Option<Weekday> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.weekday())
}

/// Calendrier à table de jours fériés, week-end = samedi + dimanche.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    holidays: BTreeMap<(i32, u32), BTreeSet<u32>>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holidays<I: IntoIterator<Item = u32>>(mut self, year: i32, month: u32, days: I) -> Self {
        self.add_holidays(year, month, days);
        self
    }

    pub fn add_holidays<I: IntoIterator<Item = u32>>(&mut self, year: i32, month: u32, days: I) {
        self.holidays.entry((year, month)).or_default().extend(days);
    }

    pub fn holidays(&self, year: i32, month: u32) -> Vec<u32> {
        self.holidays
            .get(&(year, month))
            .map(|days| days.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Jours fériés coréens 2025.
    pub fn korea_2025() -> Self {
        const TABLE: [(u32, &[u32]); 12] = [
            (1, &[1]),
            (2, &[9, 10]),
            (3, &[1]),
            (4, &[10]),
            (5, &[5, 15]),
            (6, &[6]),
            (7, &[]),
            (8, &[15]),
            (9, &[14, 15, 16]),
            (10, &[3, 9]),
            (11, &[]),
            (12, &[25]),
        ];
        TABLE
            .iter()
            .fold(Self::new(), |cal, (month, days)| cal.with_holidays(2025, *month, days.iter().copied()))
    }
}

impl CalendarProvider for HolidayCalendar {
    fn days_in_month(&self, year: i32, month: u32) -> Result<u32, CalendarError> {
        days_in_month(year, month)
    }

    fn is_weekend(&self, year: i32, month: u32, day: u32) -> bool {
        matches!(weekday(year, month, day), Some(Weekday::Sat | Weekday::Sun))
    }

    fn is_holiday(&self, year: i32, month: u32, day: u32) -> bool {
        self.holidays
            .get(&(year, month))
            .is_some_and(|days| days.contains(&day))
    }
}

/// Ajustements ponctuels du calendrier pour une génération.
///
/// `added` : jours traités comme fériés ; `removed` : jours traités comme
/// ouvrés, même un week-end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayOverrides {
    pub added: BTreeSet<u32>,
    pub removed: BTreeSet<u32>,
}

impl HolidayOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn add(mut self, day: u32) -> Self {
        self.added.insert(day);
        self
    }

    pub fn remove(mut self, day: u32) -> Self {
        self.removed.insert(day);
        self
    }
}
