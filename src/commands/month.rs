use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use owo_colors::OwoColorize;
use photocal_core::calendar_view::{MonthGrid, saved_summary};
use photocal_core::photocal::Photocal;

use crate::render::Render;

pub fn run(photocal: &Photocal, month: Option<&str>) -> Result<()> {
    let today = Local::now().date_naive();
    let (year, month) = match month {
        Some(m) => parse_month(m)?,
        None => (today.year(), today.month()),
    };

    let store = photocal.store();
    let grid = MonthGrid::new(store.events(), year, month, today)
        .with_context(|| format!("Invalid month: {}-{:02}", year, month))?;

    println!("{}", grid.render());

    let (prev_year, prev_month) = grid.previous();
    let (next_year, next_month) = grid.next();
    println!(
        "{}",
        format!(
            "{} this month, {}  ·  prev: {}-{:02}  next: {}-{:02}",
            grid.event_count(),
            saved_summary(store.len()),
            prev_year,
            prev_month,
            next_year,
            next_month
        )
        .dimmed()
    );

    Ok(())
}

/// Parse "YYYY-MM".
fn parse_month(input: &str) -> Result<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Could not parse month: \"{}\" (use YYYY-MM)", input))?;
    Ok((date.year(), date.month()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_year_month() {
        assert_eq!(parse_month("2024-03").unwrap(), (2024, 3));
        assert_eq!(parse_month(" 2025-12 ").unwrap(), (2025, 12));
    }

    #[test]
    fn rejects_bad_months() {
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("March").is_err());
        assert!(parse_month("2024-03-05").is_err());
    }
}
