//! TUI configuration: `~/.config/trailpack/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TuiConfig {
    /// API base URL. Empty means "use the environment default".
    #[serde(default)]
    pub server_url: String,
    /// Stored access token from a previous login.
    #[serde(default)]
    pub auth_token: String,
}

pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("app", "trailpack", "trailpack")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load the config file; missing or unreadable files yield defaults.
pub fn load() -> TuiConfig {
    let Some(path) = config_path() else {
        return TuiConfig::default();
    };
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|text| toml::from_str(&text).ok())
        .unwrap_or_default()
}

/// Persist the config, creating the directory if needed.
pub fn save(config: &TuiConfig) -> anyhow::Result<()> {
    let Some(path) = config_path() else {
        anyhow::bail!("no config directory available");
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(config)?;
    std::fs::write(&path, text)?;
    Ok(())
}

/// Base URL to use: config file first, then environment.
pub fn resolve_server_url(config: &TuiConfig) -> String {
    if !config.server_url.is_empty() {
        return config.server_url.clone();
    }
    trailpack_api_client::default_base_url()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_defers_to_environment_default() {
        let config = TuiConfig::default();
        let url = resolve_server_url(&config);
        assert!(!url.is_empty());
    }

    #[test]
    fn configured_url_wins() {
        let config = TuiConfig {
            server_url: "http://gear.local:9000".into(),
            auth_token: String::new(),
        };
        assert_eq!(resolve_server_url(&config), "http://gear.local:9000");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = TuiConfig {
            server_url: "http://localhost:3000".into(),
            auth_token: "jwt".into(),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let back: TuiConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.server_url, config.server_url);
        assert_eq!(back.auth_token, config.auth_token);
    }
}
