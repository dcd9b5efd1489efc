//! Terminal rendering for photocal types.
//!
//! Extension traits that add colored output to photocal-core types using
//! owo_colors. Padding is applied before coloring so ANSI codes never throw
//! off column widths.

use owo_colors::OwoColorize;
use photocal_core::EventRecord;
use photocal_core::calendar_view::{DayCell, MAX_EVENTS_PER_CELL, MonthGrid};

pub trait Render {
    fn render(&self) -> String;
}

/// One line in a day listing: time, title, context, id.
impl Render for EventRecord {
    fn render(&self) -> String {
        let mut line = format!("  {:>8}  {}", self.time_label(), self.display_title());
        if !self.context.trim().is_empty() {
            line.push_str(&format!("  {}", self.context.dimmed()));
        }
        line.push_str(&format!("  {}", format!("[{}]", self.id).dimmed()));
        line
    }
}

/// Multi-line view of a single record, used when reviewing an extraction.
pub struct Card<'a>(pub &'a EventRecord);

impl Render for Card<'_> {
    fn render(&self) -> String {
        let record = self.0;
        let mut lines = vec![
            format!("  {}", record.display_title().bold()),
            format!("  {} at {}", record.date_label(), record.time_label()),
        ];
        if !record.context.trim().is_empty() {
            lines.push(format!("  {}", record.context.dimmed()));
        }
        if let Some(photo) = &record.photo_url {
            lines.push(format!("  {}", photo.dimmed()));
        }
        lines.join("\n")
    }
}

const CELL_WIDTH: usize = 14;
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

impl Render for MonthGrid<'_> {
    fn render(&self) -> String {
        let mut lines = vec![self.title().bold().to_string(), String::new()];

        let header: Vec<String> = WEEKDAYS.iter().map(|d| fit(d, CELL_WIDTH)).collect();
        lines.push(header.join(" ").dimmed().to_string());

        for week in self.weeks() {
            lines.push(render_row(&week, |cell| {
                let day = fit(&cell.day().to_string(), CELL_WIDTH);
                if cell.is_today {
                    day.cyan().bold().to_string()
                } else {
                    day.bold().to_string()
                }
            }));

            for slot in 0..MAX_EVENTS_PER_CELL {
                if week.iter().flatten().all(|cell| cell.visible().len() <= slot) {
                    break;
                }
                lines.push(render_row(&week, |cell| match cell.visible().get(slot) {
                    Some(event) => fit(event.display_title(), CELL_WIDTH).green().to_string(),
                    None => fit("", CELL_WIDTH),
                }));
            }

            if week.iter().flatten().any(|cell| cell.overflow() > 0) {
                lines.push(render_row(&week, |cell| match cell.overflow() {
                    0 => fit("", CELL_WIDTH),
                    n => fit(&format!("+{} more", n), CELL_WIDTH).dimmed().to_string(),
                }));
            }

            lines.push(String::new());
        }

        lines.join("\n")
    }
}

fn render_row(week: &[Option<&DayCell>], cell_text: impl Fn(&DayCell) -> String) -> String {
    week.iter()
        .map(|cell| match *cell {
            Some(cell) => cell_text(cell),
            None => fit("", CELL_WIDTH),
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

/// Pad or truncate `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{:<width$}", text, width = width)
    } else {
        let truncated: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
