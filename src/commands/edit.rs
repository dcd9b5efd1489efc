use anyhow::Result;
use owo_colors::OwoColorize;
use photocal_core::EventRecord;
use photocal_core::controller::Controller;
use photocal_core::photocal::Photocal;
use photocal_core::vision::VisionService;

use crate::commands::fields;
use crate::render::{Card, Render};

/// Field overrides from the command line.
#[derive(Debug, Default)]
pub struct FieldChanges {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub context: Option<String>,
}

impl FieldChanges {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.date.is_none() && self.time.is_none() && self.context.is_none()
    }

    fn apply(self, mut record: EventRecord) -> Result<EventRecord> {
        if let Some(title) = self.title {
            record.title = title.trim().to_string();
        }
        if let Some(date) = self.date {
            record.date = fields::normalize_date(&date)?;
        }
        if let Some(time) = self.time {
            record.time = fields::normalize_time(&time)?;
        }
        if let Some(context) = self.context {
            record.context = context.trim().to_string();
        }
        Ok(record)
    }
}

pub fn run(photocal: &Photocal, id: &str, changes: FieldChanges) -> Result<()> {
    let mut controller = photocal.controller()?;

    let Some(existing) = controller.get(id).cloned() else {
        anyhow::bail!("No saved event with id '{}'", id);
    };

    let edited = if changes.is_empty() {
        println!("{}", Card(&existing).render());
        println!();
        fields::edit_record(existing.clone())?
    } else {
        changes.apply(existing.clone())?
    };

    if edited == existing {
        println!("{}", "Nothing changed".dimmed());
        return Ok(());
    }

    let title = edited.display_title().to_string();
    commit(&mut controller, id, edited)?;
    println!("{}", format!("  Updated: {}", title).green());

    Ok(())
}

/// Write the edit back. The store reloads first, so the record may be gone.
fn commit<S: VisionService>(controller: &mut Controller<S>, id: &str, edited: EventRecord) -> Result<()> {
    if !controller.update(edited)? {
        anyhow::bail!("No saved event with id '{}'", id);
    }
    Ok(())
}
