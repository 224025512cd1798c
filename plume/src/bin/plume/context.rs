use anyhow::{Context, Result};
use plume::{KeyContext, PlumeConfig, PostManager, RedisIdentityStore, RedisPostStore, store::redis::connect};
use std::path::{Path, PathBuf};

pub type RedisManager = PostManager<RedisIdentityStore, RedisPostStore>;

const CONFIG_DIR: &str = ".plume";
const CONFIG_FILE: &str = "config.toml";

/// Configuration discovered for the current invocation.
pub struct CliContext {
    /// Path of the loaded config file, if one was found
    pub config_path: Option<PathBuf>,
    pub config: PlumeConfig,
    redis_url_override: Option<String>,
}

impl CliContext {
    /// Load `.plume/config.toml` from the current directory or its ancestors.
    pub fn find(redis_url_override: Option<String>) -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir, redis_url_override)
    }

    pub fn find_from(start: &Path, redis_url_override: Option<String>) -> Result<Self> {
        let config_path = Self::find_config(start);
        let config = match &config_path {
            Some(path) => PlumeConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))?,
            None => PlumeConfig::default(),
        };
        Ok(Self {
            config_path,
            config,
            redis_url_override,
        })
    }

    fn find_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_DIR).join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// `--redis-url` wins over the config file.
    pub fn redis_url(&self) -> Result<String> {
        if let Some(url) = &self.redis_url_override {
            return Ok(url.clone());
        }
        self.config
            .redis
            .resolved_url()
            .context("No Redis URL available. Set REDIS_URL, pass --redis-url, or configure .plume/config.toml")
    }

    pub fn key_context(&self) -> KeyContext {
        KeyContext::new(&self.config.store.prefix, &self.config.store.service)
    }

    pub async fn manager(&self) -> Result<RedisManager> {
        let url = self.redis_url()?;
        let conn = connect(&url).await.context("Failed to connect to Redis")?;
        let keys = self.key_context();
        Ok(PostManager::from_settings(
            RedisIdentityStore::new(conn.clone(), keys.clone()),
            RedisPostStore::new(conn, keys),
            &self.config.manager,
        ))
    }
}
