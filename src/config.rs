use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_ENV: &str = "LUMEN_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Size of a single transport read. Request bodies larger than this
    /// reach dynamic resources in several deliveries.
    pub read_chunk: usize,
    pub max_head_size: usize,
    /// Deadline for receiving a whole request body, in milliseconds. A
    /// dynamic resource stays locked to its request until then at most.
    pub body_timeout_ms: u64,
    /// Unread body bytes drained after an error reply to keep the
    /// connection. Larger leftovers close it instead.
    pub max_drain: usize,
    pub led_count: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            read_chunk: 1024,
            max_head_size: 8192,
            body_timeout_ms: 10_000,
            max_drain: 64 * 1024,
            led_count: 4,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                Self::from_yaml(&raw)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var("LISTEN") {
            cfg.listen_addr = addr;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(raw).context("invalid YAML config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn body_timeout(&self) -> Duration {
        Duration::from_millis(self.body_timeout_ms)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.read_chunk == 0 {
            anyhow::bail!("read_chunk must be greater than zero");
        }
        if self.max_head_size < 16 {
            anyhow::bail!("max_head_size too small: {}", self.max_head_size);
        }
        if self.body_timeout_ms == 0 {
            anyhow::bail!("body_timeout_ms must be greater than zero");
        }
        Ok(())
    }
}
