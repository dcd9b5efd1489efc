use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use photocal_core::photocal::Photocal;

use crate::render::{Card, Render};

pub fn run(photocal: &Photocal, id: &str, force: bool) -> Result<()> {
    let mut controller = photocal.controller()?;

    let Some(record) = controller.get(id).cloned() else {
        anyhow::bail!("No saved event with id '{}'", id);
    };

    println!("{}", Card(&record).render());

    if !force {
        println!();
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete \"{}\"?", record.display_title()))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    if controller.remove(id).is_some() {
        println!("{}", format!("  Deleted: {}", record.display_title()).red());
    }

    Ok(())
}
