//! Prompts and parsing shared by the review and edit flows.

use anyhow::Result;
use dialoguer::Input;
use owo_colors::OwoColorize;
use photocal_core::EventRecord;
use photocal_core::validate::{is_canonical_date, is_valid_time, parse_date};

/// Accept a canonical date or anything `parse_date` understands,
/// returning `YYYY-MM-DD`.
pub fn normalize_date(input: &str) -> Result<String> {
    let input = input.trim();
    if is_canonical_date(input) {
        return Ok(input.to_string());
    }

    parse_date(input)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| anyhow::anyhow!("Could not parse date: \"{}\" (use YYYY-MM-DD)", input))
}

pub fn normalize_time(input: &str) -> Result<String> {
    let input = input.trim();
    if is_valid_time(input) {
        Ok(input.to_string())
    } else {
        anyhow::bail!("Invalid time: \"{}\" (use 24-hour HH:MM)", input)
    }
}

/// Prompt with the current value pre-filled, re-asking until `parse` accepts.
fn prompt_with_retry<F>(prompt: &str, current: &str, parse: F) -> Result<String>
where
    F: Fn(&str) -> Result<String>,
{
    loop {
        let input: String = Input::new()
            .with_prompt(prompt)
            .with_initial_text(current)
            .interact_text()?;
        match parse(&input) {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}

fn prompt_free_text(prompt: &str, current: &str) -> Result<String> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;
    Ok(input.trim().to_string())
}

/// Walk through every field of `record`, keeping the id and photo.
pub fn edit_record(mut record: EventRecord) -> Result<EventRecord> {
    record.title = prompt_free_text("  Title", &record.title)?;
    record.date = prompt_with_retry("  Date", &record.date, normalize_date)?;
    record.time = prompt_with_retry("  Time", &record.time, normalize_time)?;
    record.context = prompt_free_text("  Where / what", &record.context)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_date_passes_through() {
        assert_eq!(normalize_date("2024-03-20").unwrap(), "2024-03-20");
        assert_eq!(normalize_date("  2024-03-20 ").unwrap(), "2024-03-20");
    }

    #[test]
    fn loose_dates_are_normalized() {
        assert_eq!(normalize_date("March 20, 2024").unwrap(), "2024-03-20");
        assert_eq!(normalize_date("03/20/2024").unwrap(), "2024-03-20");
    }

    #[test]
    fn unparseable_date_is_an_error() {
        assert!(normalize_date("next tuesday-ish").is_err());
        assert!(normalize_date("2024-02-30").is_err());
        assert!(normalize_date("").is_err());
    }

    #[test]
    fn times_must_be_24_hour() {
        assert_eq!(normalize_time("19:30").unwrap(), "19:30");
        assert_eq!(normalize_time("9:05").unwrap(), "9:05");
        assert!(normalize_time("7pm").is_err());
        assert!(normalize_time("24:00").is_err());
        assert!(normalize_time("9:5").is_err());
    }
}
