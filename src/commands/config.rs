use anyhow::Result;
use owo_colors::OwoColorize;
use photocal_core::constants::STORAGE_KEY;
use photocal_core::photocal::Photocal;
use photocal_core::photocal_config::PhotocalConfig;
use photocal_core::store::FileKeyValue;

pub fn run(photocal: &Photocal) -> Result<()> {
    let config_path = PhotocalConfig::config_path()?;
    let events_path = FileKeyValue::new(photocal.data_path()).path_for(STORAGE_KEY);
    let config = photocal.config();

    println!("{}", "Paths".bold());
    println!("  Config:   {}", config_path.display());
    println!("  Data:     {}", photocal.display_path().display());
    println!("  Events:   {}", events_path.display());

    println!();
    println!("{}", "Vision".bold());
    println!("  Model:    {}", config.model);
    println!("  API:      {}", config.api_base);
    println!("  Timeout:  {}s", config.timeout_secs);

    let key_status = if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.trim().is_empty()) {
        "from OPENAI_API_KEY".green().to_string()
    } else {
        "not set (pass --api-key or you'll be prompted)".dimmed().to_string()
    };
    println!("  API key:  {}", key_status);

    Ok(())
}
