use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use std::path::{Path, PathBuf};

use super::ShadeConfig;

// Embed the default config at compile time
pub const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

impl ShadeConfig {
    /// Load the merged configuration.
    ///
    /// `custom_config` replaces the user and project files when given.
    /// `overrides` are merged last, so command-line values always win.
    pub fn load(custom_config: Option<&str>, overrides: Option<serde_json::Value>) -> Result<Self> {
        let figment = Self::figment(custom_config, overrides)?;
        let config: ShadeConfig = figment
            .extract()
            .context("Failed to parse shaderank configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn figment(custom_config: Option<&str>, overrides: Option<serde_json::Value>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom_config {
            let path = expand_tilde(custom_path);
            if !path.is_file() {
                bail!("Configuration file '{}' does not exist", path.display());
            }
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(&path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(&path)),
                _ => figment.merge(Toml::file(&path)),
            };
        } else {
            figment = figment
                .merge(Toml::file(Self::user_config_path()))
                .merge(Toml::file("shaderank.toml"));
        }

        // Environment variables beat files, e.g. SHADERANK_RANKING__BATCHES=5
        figment = figment.merge(Env::prefixed("SHADERANK_").split("__"));

        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        Ok(figment)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    fn user_config_path() -> PathBuf {
        match std::env::var("HOME") {
            Ok(home) => Path::new(&home).join(".config/shaderank/config.toml"),
            Err(_) => PathBuf::from("~/.config/shaderank/config.toml"),
        }
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    match (path.strip_prefix("~"), std::env::var("HOME")) {
        (Ok(rest), Ok(home)) => Path::new(&home).join(rest),
        _ => path.to_path_buf(),
    }
}
