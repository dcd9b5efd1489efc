//! Photocal root: configuration plus the handles built from it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};

use crate::controller::Controller;
use crate::error::{PhotocalError, PhotocalResult};
use crate::photocal_config::PhotocalConfig;
use crate::pipeline::{Pipeline, PipelineSettings};
use crate::store::{EventStore, FileKeyValue};
use crate::vision::OpenAiClient;

#[derive(Debug, Clone)]
pub struct Photocal {
    config: PhotocalConfig,
}

impl Photocal {
    /// Load ~/.config/photocal/config.toml (creating it on first run),
    /// overridden by `PHOTOCAL_*` environment variables.
    pub fn load() -> PhotocalResult<Self> {
        let config_path = PhotocalConfig::config_path()?;

        if !config_path.exists() {
            PhotocalConfig::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> PhotocalResult<Self> {
        let config: PhotocalConfig = Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(Environment::with_prefix("PHOTOCAL"))
            .build()
            .map_err(|e| PhotocalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PhotocalError::Config(e.to_string()))?;

        Ok(Photocal { config })
    }

    pub fn from_config(config: PhotocalConfig) -> Self {
        Photocal { config }
    }

    pub fn config(&self) -> &PhotocalConfig {
        &self.config
    }

    pub fn data_path(&self) -> PathBuf {
        let full_path_str =
            shellexpand::tilde(&self.config.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Returns the data directory in display-friendly form,
    /// keeping `~` instead of expanding to the full home directory.
    pub fn display_path(&self) -> PathBuf {
        self.config.data_dir.clone()
    }

    pub fn store(&self) -> EventStore {
        EventStore::open(FileKeyValue::new(self.data_path()))
    }

    pub fn pipeline(&self) -> PhotocalResult<Pipeline<OpenAiClient>> {
        let deadline = Duration::from_secs(self.config.timeout_secs);
        let client = OpenAiClient::new(&self.config.api_base, deadline)?;

        let settings = PipelineSettings {
            model: self.config.model.clone(),
            deadline,
            ..PipelineSettings::default()
        };

        Ok(Pipeline::new(client, settings))
    }

    /// Controller over the configured pipeline and the on-disk store.
    pub fn controller(&self) -> PhotocalResult<Controller<OpenAiClient>> {
        Ok(Controller::new(self.pipeline()?, self.store()))
    }
}
