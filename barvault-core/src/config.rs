use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::paths::data_root;

#[derive(Debug, Deserialize, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataFiles {
    /// Base directory for flat-file libraries. Empty means the per-user
    /// default under the home directory.
    pub dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Bars {
    pub what_to_show: String,
    pub bar_size: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub database: Database,
    pub data: DataFiles,
    pub bars: Bars,
}

impl Settings {
    /// Defaults overlaid with an optional `config.*` file and `BARVAULT_*`
    /// environment variables (`.env` is loaded first when present). Stores
    /// are constructed from these settings by the orchestrator and passed
    /// in; nothing here opens a connection or touches the filesystem.
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load(Some("config"))
    }

    fn load(file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("database.url", "sqlite://barvault.db")?
            .set_default("data.dir", "")?
            .set_default("bars.what_to_show", "TRADES")?
            .set_default("bars.bar_size", "30 secs")?;

        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        let s = builder
            .add_source(Environment::with_prefix("BARVAULT").separator("__"))
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;

        if settings.data.dir.is_empty() {
            let dir = data_root().map_err(|e| ConfigError::Message(e.to_string()))?;
            settings.data.dir = dir.to_string_lossy().into_owned();
        }

        Ok(settings)
    }

    /// Library name for the configured (whatToShow, barSize) pair, e.g.
    /// `TRADES_30 secs`; backends normalize the remaining spaces.
    pub fn library(&self) -> String {
        format!("{}_{}", self.bars.what_to_show, self.bars.bar_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.database.url, "sqlite://barvault.db");
        assert_eq!(settings.library(), "TRADES_30 secs");
        assert!(!settings.data.dir.is_empty());
    }

    #[test]
    fn environment_variables_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("BARVAULT__DATA__DIR", dir.path());
        let settings = Settings::load(None).unwrap();
        std::env::remove_var("BARVAULT__DATA__DIR");

        assert_eq!(settings.data.dir, dir.path().to_string_lossy());
        assert_eq!(settings.database.url, "sqlite://barvault.db");
    }
}
