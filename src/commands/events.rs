use anyhow::Result;
use owo_colors::OwoColorize;
use photocal_core::calendar_view::{group_by_date, saved_summary};
use photocal_core::photocal::Photocal;

use crate::render::Render;

pub fn run(photocal: &Photocal, json: bool) -> Result<()> {
    let store = photocal.store();

    if json {
        println!("{}", serde_json::to_string_pretty(store.events())?);
        return Ok(());
    }

    if store.is_empty() {
        println!("{}", "No events saved yet".dimmed());
        println!("{}", "Add one with: photocal analyze <photo>".dimmed());
        return Ok(());
    }

    for (i, day) in group_by_date(store.events()).iter().enumerate() {
        if i > 0 {
            println!();
        }
        // Every event in a group shares the date, so the first one labels it
        let label = day
            .events
            .first()
            .map(|e| e.date_label())
            .unwrap_or_else(|| day.date.clone());
        println!("{}", label.bold());

        for event in &day.events {
            println!("{}", event.render());
        }
    }

    println!();
    println!("{}", saved_summary(store.len()).dimmed());

    Ok(())
}
