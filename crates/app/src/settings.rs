//! Handles settings for the application. Configuration is read from
//! `settings.toml` (or the file given with `--config`) and environment
//! variables prefixed with `SPENDLOG`, e.g. `SPENDLOG__SERVER__PORT=8080`.

use std::str::FromStr;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use engine::Tz;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings.toml";

#[derive(Debug, Parser)]
#[command(name = "spendlog", version, about = "Personal expense tracker API")]
struct Args {
    /// Config file path (TOML). Missing files are ignored.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            database: Database::Memory,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// IANA timezone used to bucket expenses into days and months.
    pub timezone: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

impl EngineSettings {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        Tz::from_str(&self.timezone).map_err(|err| {
            ConfigError::Message(format!("invalid timezone '{}': {err}", self.timezone))
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub engine: EngineSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        Self::load(args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH))
    }

    fn load(path: &str) -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name(path).required(false))
                .add_source(Environment::with_prefix("SPENDLOG").separator("__"))
                .build()?,
        )
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.engine.tz()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        Settings::from_config(
            Config::builder()
                .add_source(File::from_str(toml, FileFormat::Toml))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn empty_config_uses_defaults() {
        let settings = from_toml("").unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.bind, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.database, Database::Memory);
        assert_eq!(settings.engine.tz().unwrap(), Tz::UTC);
    }

    #[test]
    fn reads_sqlite_database_and_timezone() {
        let settings = from_toml(
            r#"
            [app]
            level = "debug"

            [server]
            port = 8080
            database = { sqlite = "data/spendlog.db" }

            [engine]
            timezone = "Europe/Rome"
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(
            settings.server.database.url(),
            "sqlite:data/spendlog.db?mode=rwc"
        );
        assert_eq!(settings.engine.tz().unwrap(), chrono_tz::Europe::Rome);
    }

    #[test]
    fn unknown_timezone_is_a_config_error() {
        let err = from_toml("[engine]\ntimezone = \"Mars/Olympus\"").unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }
}
