//! Stock combat content: actions, buffs, and balance tables.
//!
//! This crate turns data files and declarative specs into a populated
//! [`ActionRegistry`](combat_core::ActionRegistry):
//! - balance tables (data-driven via TOML) → [`CombatTables`]
//! - buff catalog (data-driven via TOML) → [`BuffCatalog`]
//! - the stock cooldown set and plain commands, registered through
//!   [`cooldowns::register_all`]
//!
//! Content never appears in persisted actor state; actors reference effects
//! and actions by name only.

pub mod buffs;
pub mod commands;
pub mod cooldowns;
pub mod tables;

pub use buffs::{BuffCatalog, BuffTemplate};
pub use cooldowns::{register_all, stock_actions};
pub use tables::CombatTables;

use combat_core::{ActionRegistry, CombatConfig};

/// Build the fully-populated stock registry and its matching balance
/// config in one step.
pub fn stock_setup() -> anyhow::Result<(ActionRegistry, CombatConfig)> {
    let catalog = BuffCatalog::embedded()?;
    let config = CombatTables::embedded()?.into_config();
    let mut registry = ActionRegistry::new();
    register_all(&mut registry, &catalog);
    Ok((registry, config))
}
