//! Buff catalog.
//!
//! Named effect templates referenced by action handlers. The catalog keeps
//! narration text and default durations out of the handlers themselves, so
//! adjusting an effect means editing `data/buffs.toml`, not code.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

use combat_core::EffectParams;

const EMBEDDED_BUFFS: &str = include_str!("../data/buffs.toml");

/// One catalog entry as it appears in `data/buffs.toml`.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuffTemplate {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub debuff: bool,
    /// `None` means the effect never expires on its own.
    #[serde(default)]
    pub duration_secs: Option<u64>,
    /// Potency scaling granted while active (buffs only; 100 = neutral).
    #[serde(default)]
    pub potency_percent: Option<u32>,
    /// Present for damage-over-time effects.
    #[serde(default)]
    pub tick_interval_secs: Option<u64>,
    #[serde(default)]
    pub tick_message: Option<String>,
}

impl BuffTemplate {
    fn duration(&self) -> Option<Duration> {
        self.duration_secs.map(Duration::from_secs)
    }

    /// Effect parameters for a plain buff or debuff application.
    pub fn effect(&self) -> EffectParams {
        let params = if self.debuff {
            EffectParams::debuff(&self.name, self.duration())
        } else {
            EffectParams::buff(&self.name, self.duration())
        };
        match self.potency_percent {
            Some(percent) => params.with_potency_percent(percent),
            None => params,
        }
    }

    /// Effect parameters for a damage-over-time application dealing
    /// `per_tick` on each tick. Uses the template's interval, falling back
    /// to one tick every two seconds if the sheet omits it.
    pub fn dot_effect(&self, per_tick: u32) -> EffectParams {
        EffectParams::dot(
            &self.name,
            per_tick,
            self.duration().unwrap_or(Duration::from_secs(30)),
            Duration::from_secs(self.tick_interval_secs.unwrap_or(2)),
            self.tick_message.clone(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct BuffSheet {
    #[serde(rename = "buff")]
    buffs: Vec<BuffTemplate>,
}

/// All known effect templates, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct BuffCatalog {
    templates: HashMap<String, BuffTemplate>,
}

impl BuffCatalog {
    /// The stock catalog bundled with this crate.
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_toml(EMBEDDED_BUFFS).context("embedded buff catalog is invalid")
    }

    pub fn from_toml(source: &str) -> anyhow::Result<Self> {
        let sheet: BuffSheet = toml::from_str(source).context("failed to parse buff catalog")?;
        let mut templates = HashMap::new();
        for template in sheet.buffs {
            if templates
                .insert(template.name.clone(), template)
                .is_some()
            {
                bail!("buff catalog declares a name twice");
            }
        }
        Ok(Self { templates })
    }

    pub fn get(&self, name: &str) -> Option<&BuffTemplate> {
        self.templates.get(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::EffectKind;

    #[test]
    fn embedded_catalog_has_the_stock_templates() {
        let catalog = BuffCatalog::embedded().unwrap();
        for name in ["concentrating", "stunned", "vanished", "shocked"] {
            assert!(catalog.get(name).is_some(), "missing template '{name}'");
        }
    }

    #[test]
    fn concentrating_doubles_potency_for_ten_seconds() {
        let catalog = BuffCatalog::embedded().unwrap();
        let params = catalog.get("concentrating").unwrap().effect();
        assert_eq!(
            params.kind,
            EffectKind::Buff {
                potency_percent: 200
            }
        );
        assert_eq!(params.duration, Some(Duration::from_secs(10)));
    }

    #[test]
    fn shocked_builds_a_dot_with_catalog_timing() {
        let catalog = BuffCatalog::embedded().unwrap();
        let params = catalog.get("shocked").unwrap().dot_effect(9);
        assert_eq!(params.duration, Some(Duration::from_secs(30)));
        let EffectKind::DamageOverTime {
            per_tick,
            interval,
            tick_message,
        } = params.kind
        else {
            panic!("shocked should be a damage-over-time effect");
        };
        assert_eq!(per_tick, 9);
        assert_eq!(interval, Duration::from_secs(2));
        assert!(tick_message.is_some());
    }

    #[test]
    fn vanished_is_indefinite() {
        let catalog = BuffCatalog::embedded().unwrap();
        let params = catalog.get("vanished").unwrap().effect();
        assert_eq!(params.duration, None);
    }
}
