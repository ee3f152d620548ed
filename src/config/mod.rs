//! # Configuration
//!
//! Game rules, match settings, catalog location and logging, read from a
//! TOML file. Every section has defaults so a partial file loads.
//!
//! ```toml
//! [shop]
//! pack = "StandardPack"
//! stipend = 10
//! reroll_cost = 1
//! sell_refund = 1
//! roster_capacity = 5
//! starting_health = 15
//!
//! [versus]
//! players = 2
//! turns = 5
//! max_actions_per_turn = 40
//!
//! [catalog]
//! path = "data/catalog.json"
//!
//! [logging]
//! level = "info"
//! file = "autobattler.log"
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use autobattler::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Stipend: {}", config.shop.stipend);
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Economy and roster rules applied to every shop turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShopConfig {
    /// Shop type; only templates listing this pack are offered.
    pub pack: String,
    /// Coins granted at the start of every turn (replaces leftovers).
    pub stipend: u32,
    pub reroll_cost: u32,
    pub sell_refund: u32,
    pub roster_capacity: usize,
    pub starting_health: i32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            pack: "StandardPack".to_string(),
            stipend: 10,
            reroll_cost: 1,
            sell_refund: 1,
            roster_capacity: 5,
            starting_health: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VersusConfig {
    pub players: usize,
    pub turns: u32,
    /// Agents that have not ended their turn after this many actions are
    /// ended automatically.
    pub max_actions_per_turn: usize,
}

impl Default for VersusConfig {
    fn default() -> Self {
        Self {
            players: 2,
            turns: 5,
            max_actions_per_turn: 40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "data/catalog.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub shop: ShopConfig,
    #[serde(default)]
    pub versus: VersusConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config = Self::from_toml(&content)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| anyhow!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.shop.pack.trim().is_empty() {
            bail!("shop.pack must not be empty");
        }
        if self.shop.roster_capacity == 0 {
            bail!("shop.roster_capacity must be at least 1");
        }
        if self.shop.starting_health <= 0 {
            bail!("shop.starting_health must be positive");
        }
        if self.versus.players == 0 {
            bail!("versus.players must be at least 1");
        }
        if self.versus.turns == 0 {
            bail!("versus.turns must be at least 1");
        }
        if self.versus.max_actions_per_turn == 0 {
            bail!("versus.max_actions_per_turn must be at least 1");
        }
        match self.logging.level.to_ascii_lowercase().as_str() {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => bail!("unknown logging.level '{}'", other),
        }
    }
}
