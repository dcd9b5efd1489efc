use std::path::Path;

use anyhow::{Context, Result};
use dialoguer::Select;
use owo_colors::OwoColorize;
use photocal_core::calendar_view::saved_summary;
use photocal_core::image::ImageSource;
use photocal_core::photocal::Photocal;

use crate::commands::fields;
use crate::render::{Card, Render};
use crate::utils::tui;

const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub async fn run(photocal: &Photocal, image: &Path, api_key: Option<String>, yes: bool) -> Result<()> {
    let source = ImageSource::from_path(image)
        .with_context(|| format!("Failed to read image {}", image.display()))?;
    tracing::debug!(kind = %source.image_type(), bytes = source.len(), "image loaded");

    let mut controller = photocal.controller()?;
    controller.set_credential(&resolve_api_key(api_key)?);

    let name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| image.display().to_string());
    let spinner = tui::create_spinner(format!("Reading {}", name));
    let result = controller.upload_until(source, ctrl_c()).await;
    spinner.finish_and_clear();

    let mut record = result.context("Failed to analyze image")?;

    println!("{}", Card(&record).render());
    println!();

    if !yes {
        loop {
            let choice = Select::new()
                .with_prompt("  Save this event?")
                .items(&["Save", "Edit", "Discard"])
                .default(0)
                .interact()?;

            match choice {
                0 => break,
                1 => {
                    record = fields::edit_record(record)?;
                    println!();
                    println!("{}", Card(&record).render());
                    println!();
                }
                _ => {
                    controller.cancel();
                    println!("{}", "  Discarded".dimmed());
                    return Ok(());
                }
            }
        }
    }

    let title = record.display_title().to_string();
    controller.save(record)?;

    println!("{}", format!("  Saved: {}", title).green());
    println!("{}", saved_summary(controller.events().len()).dimmed());

    Ok(())
}

/// `--api-key`, then the environment, then a hidden prompt.
fn resolve_api_key(flag: Option<String>) -> Result<String> {
    let from_env = std::env::var(API_KEY_ENV).ok();

    match pick_api_key(flag, from_env) {
        Some(key) => Ok(key),
        None => {
            let key = rpassword::prompt_password("OpenAI API key: ")
                .context("Failed to read API key")?;
            if key.trim().is_empty() {
                anyhow::bail!("An OpenAI API key is required. Pass --api-key or set {}.", API_KEY_ENV);
            }
            Ok(key)
        }
    }
}

fn pick_api_key(flag: Option<String>, from_env: Option<String>) -> Option<String> {
    [flag, from_env]
        .into_iter()
        .flatten()
        .find(|key| !key.trim().is_empty())
}

/// Resolves on Ctrl-C. Never resolves if the handler can't be installed.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
