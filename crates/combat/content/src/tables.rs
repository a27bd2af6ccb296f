//! Balance tables loader.
//!
//! Deserializes the TOML balance sheet into [`CombatTables`] and converts it
//! into the [`CombatConfig`] the core consumes. The stock sheet is embedded
//! so the crate works with no filesystem access; deployments that retune
//! balance load their own copy through [`CombatTables::from_toml`].

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use combat_core::CombatConfig;

const EMBEDDED_TABLES: &str = include_str!("../data/tables.toml");

/// Balance parameters as they appear in `data/tables.toml`.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CombatTables {
    pub global_cooldown_secs: u64,
    pub default_cooldown_secs: u64,
    pub crit_chance: f64,
    pub save_die: u32,
    pub damage_variance_percent: u32,
}

impl CombatTables {
    /// The stock balance sheet bundled with this crate.
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_toml(EMBEDDED_TABLES).context("embedded balance tables are invalid")
    }

    pub fn from_toml(source: &str) -> anyhow::Result<Self> {
        toml::from_str(source).context("failed to parse balance tables")
    }

    pub fn into_config(self) -> CombatConfig {
        CombatConfig {
            global_cooldown: Duration::from_secs(self.global_cooldown_secs),
            default_cooldown: Duration::from_secs(self.default_cooldown_secs),
            crit_chance: self.crit_chance,
            save_die: self.save_die,
            damage_variance_percent: self.damage_variance_percent,
        }
    }
}
