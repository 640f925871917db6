mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = ["./config.toml", "./crosscast.toml", "/etc/crosscast/config.toml"];

    for path_str in default_paths {
        let path = Path::new(path_str);
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.app.public_url.trim().is_empty() {
        anyhow::bail!("App public_url cannot be empty");
    }

    if config.adapters.timeout_secs == 0 {
        anyhow::bail!("Adapter timeout cannot be 0");
    }

    for target in &config.platforms {
        if !target.enabled {
            continue;
        }
        match &target.kind {
            PlatformKind::Discord { webhook_url } => {
                if webhook_url.is_empty() {
                    anyhow::bail!("Discord platform is enabled but has no webhook URL");
                }
            }
            PlatformKind::Email { api_key, to, .. } => {
                if api_key.is_empty() {
                    anyhow::bail!("Email platform is enabled but has no API key");
                }
                if to.is_empty() {
                    anyhow::bail!("Email platform is enabled but has no recipients");
                }
            }
            PlatformKind::Linkedin {
                access_token,
                author_id,
                ..
            } => {
                if access_token.is_empty() || author_id.is_empty() {
                    anyhow::bail!("LinkedIn platform is enabled but has no credentials");
                }
            }
            PlatformKind::Youtube { access_token, .. } => {
                if access_token.is_empty() {
                    anyhow::bail!("YouTube platform is enabled but has no access token");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 9090

            [app]
            public_url = "https://pods.example"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.app.public_url, "https://pods.example");
        // Defaults fill the rest
        assert_eq!(config.adapters.timeout_secs, 30);
        assert!(config.platforms.is_empty());
    }

    #[test]
    fn test_parse_platform_targets() {
        let toml = r#"
            [[platforms]]
            platform = "discord"
            enabled = true
            webhook_url = "https://discord.example/webhook"

            [[platforms]]
            platform = "email"
            api_key = "re_123"
            from = "noreply@pods.example"
            to = ["list@pods.example"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.platforms.len(), 2);
        assert!(config.platforms[0].enabled);
        assert!(matches!(
            config.platforms[0].kind,
            PlatformKind::Discord { .. }
        ));
    }

    #[test]
    fn test_enabled_discord_requires_webhook() {
        let toml = r#"
            [[platforms]]
            platform = "discord"
            enabled = true
            webhook_url = ""
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(validate_config(&config).is_err());
    }
}
