use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

const FIRST_RUN_NOTICE: &str = "
    PLEASE READ:
    As a safety precaution, generated commands are never executed automatically
    by default. Enable auto-execution with 'incant config set autoexec true'
    or review each command before it runs with the --confirm flag.
    Config path: '$HOME/.incant/config.toml'
";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Execute generated commands without prompting.
    #[serde(default)]
    pub auto_execute: bool,
    /// Default target language/environment for generation.
    #[serde(default = "default_language")]
    pub language: String,
    /// Session identifier issued by the service after login or guest
    /// registration. Empty until the first login.
    #[serde(default)]
    pub flid: String,
}

fn default_language() -> String {
    "Unix/Bash".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_execute: false,
            language: default_language(),
            flid: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating it with defaults on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| anyhow!("could not parse {}: {}", config_path.display(), e))?;
            info!("Loaded config from: {}", config_path.display());
            config
        } else {
            let config = Self::default();
            config.save()?;
            print!("{}", FIRST_RUN_NOTICE);
            config
        };

        // Environment variable overrides the stored credential
        if let Ok(flid) = std::env::var("INCANT_FLID") {
            config.flid = flid;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        info!("Saved config to: {}", config_path.display());
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".incant").join("config.toml"))
    }

    /// Store the FLID issued by the service after a successful login.
    pub fn set_flid(&mut self, flid: String) -> Result<()> {
        self.flid = flid;
        self.save()?;
        info!("Login credential saved to config file");
        Ok(())
    }

    pub fn show(&self) {
        println!("auto-execute: {}", self.auto_execute);
        println!("language: {}", self.language);
        println!(
            "flid: {}",
            if self.flid.is_empty() { "(not logged in)" } else { &self.flid }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_safe() {
        let config = Config::default();
        assert!(!config.auto_execute);
        assert_eq!(config.language, "Unix/Bash");
        assert!(config.flid.is_empty());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config {
            auto_execute: true,
            language: "PowerShell".to_string(),
            flid: "flid-123".to_string(),
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert!(parsed.auto_execute);
        assert_eq!(parsed.language, "PowerShell");
        assert_eq!(parsed.flid, "flid-123");
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("auto_execute = true\n").unwrap();
        assert!(parsed.auto_execute);
        assert_eq!(parsed.language, "Unix/Bash");
        assert!(parsed.flid.is_empty());
    }
}
