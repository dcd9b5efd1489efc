//! Grouping saved events for calendar display.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::event::EventRecord;

/// Events shown per month-grid cell before collapsing into "+N more".
pub const MAX_EVENTS_PER_CELL: usize = 2;

/// All events sharing one date, earliest first.
#[derive(Debug)]
pub struct DayGroup<'a> {
    pub date: String,
    pub events: Vec<&'a EventRecord>,
}

/// Group events by date in date order. Within a day events are ordered by
/// time; events with an unreadable time keep their insertion order at the end.
pub fn group_by_date(events: &[EventRecord]) -> Vec<DayGroup<'_>> {
    let mut by_date: BTreeMap<&str, Vec<&EventRecord>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.date.as_str()).or_default().push(event);
    }

    by_date
        .into_iter()
        .map(|(date, mut events)| {
            events.sort_by_key(|e| (e.naive_time().is_none(), e.naive_time()));
            DayGroup {
                date: date.to_string(),
                events,
            }
        })
        .collect()
}

/// "1 memory saved", "3 memories saved"
pub fn saved_summary(count: usize) -> String {
    format!(
        "{} {} saved",
        count,
        if count == 1 { "memory" } else { "memories" }
    )
}

#[derive(Debug)]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    pub events: Vec<&'a EventRecord>,
    pub is_today: bool,
}

impl<'a> DayCell<'a> {
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// Events that fit in the cell.
    pub fn visible(&self) -> &[&'a EventRecord] {
        &self.events[..self.events.len().min(MAX_EVENTS_PER_CELL)]
    }

    /// How many events didn't fit.
    pub fn overflow(&self) -> usize {
        self.events.len().saturating_sub(MAX_EVENTS_PER_CELL)
    }
}

/// One month laid out Sunday-first.
#[derive(Debug)]
pub struct MonthGrid<'a> {
    pub year: i32,
    pub month: u32,
    /// Empty cells before the 1st.
    pub leading_blanks: u32,
    pub days: Vec<DayCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    /// Lay out `year`/`month`. Returns `None` for an invalid month.
    pub fn new(events: &'a [EventRecord], year: i32, month: u32, today: NaiveDate) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let leading_blanks = first.weekday().num_days_from_sunday();

        let days = first
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(|date| {
                let key = date.format("%Y-%m-%d").to_string();
                let mut day_events: Vec<&EventRecord> =
                    events.iter().filter(|e| e.date == key).collect();
                day_events.sort_by_key(|e| (e.naive_time().is_none(), e.naive_time()));

                DayCell {
                    date,
                    events: day_events,
                    is_today: date == today,
                }
            })
            .collect();

        Some(MonthGrid {
            year,
            month,
            leading_blanks,
            days,
        })
    }

    /// "March 2024"
    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    /// Rows of seven cells; `None` pads before the 1st and after the last day.
    pub fn weeks(&self) -> Vec<Vec<Option<&DayCell<'a>>>> {
        let mut cells: Vec<Option<&DayCell<'a>>> = Vec::new();
        cells.extend((0..self.leading_blanks).map(|_| None));
        cells.extend(self.days.iter().map(Some));
        while cells.len() % 7 != 0 {
            cells.push(None);
        }
        cells.chunks(7).map(|w| w.to_vec()).collect()
    }

    /// Number of events in this month.
    pub fn event_count(&self) -> usize {
        self.days.iter().map(|d| d.events.len()).sum()
    }

    pub fn previous(&self) -> (i32, u32) {
        if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        }
    }

    pub fn next(&self) -> (i32, u32) {
        if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        }
    }
}
