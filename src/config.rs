use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub user: String,
    pub staff: bool,
    pub locale: Option<String>,
    pub channel: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub asset_cache_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api/v1".to_string(),
            token: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user: "anonymous".to_string(),
            staff: false,
            locale: None,
            channel: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            asset_cache_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Add environment variables with prefix "PIM_"
        config = config.add_source(
            config::Environment::with_prefix("PIM")
                .separator("_")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// The locale/channel view the session starts in.
    pub fn scope(&self) -> crate::model::Scope {
        crate::model::Scope {
            locale: self.session.locale.clone(),
            channel: self.session.channel.clone(),
        }
    }

    /// Where asset lists are persisted between runs. Falls back to a file
    /// next to the working directory when unset.
    pub fn asset_cache_path(&self) -> PathBuf {
        self.cache
            .asset_cache_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(".pim-asset-cache.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_a_config_file() {
        let config = AppConfig::default();
        assert!(config.scope().is_global());
        assert!(!config.session.staff);
        assert_eq!(
            config.asset_cache_path(),
            PathBuf::from(".pim-asset-cache.json")
        );
    }
}
