//! The stock action set, grouped by skill line.

use combat_core::{ActionRegistry, CommandSpec};
use tracing::warn;

use crate::buffs::BuffCatalog;
use crate::commands;

pub mod evocation;
pub mod one_handed;
pub mod racial;

/// Every bundled action, in registration order.
pub fn stock_actions(catalog: &BuffCatalog) -> Vec<CommandSpec> {
    let mut specs = Vec::new();
    specs.extend(one_handed::specs());
    specs.extend(evocation::specs(catalog));
    specs.extend(racial::specs(catalog));
    specs.push(commands::cooldowns_command());
    specs
}

/// Register the stock set into `registry`.
///
/// A failed registration is logged and skipped; it never takes down the
/// rest of the set. Returns the number of actions registered.
pub fn register_all(registry: &mut ActionRegistry, catalog: &BuffCatalog) -> usize {
    let mut registered = 0;
    for spec in stock_actions(catalog) {
        let name = spec.name().to_string();
        let result = spec
            .build()
            .map_err(anyhow::Error::from)
            .and_then(|def| registry.register(def).map_err(anyhow::Error::from));
        match result {
            Ok(()) => registered += 1,
            Err(error) => warn!(action = %name, %error, "skipping action registration"),
        }
    }
    registered
}
