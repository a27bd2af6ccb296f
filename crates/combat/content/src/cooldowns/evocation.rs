//! Evocation skill: mana-fueled casts contested against saving throws.

use std::time::Duration;

use combat_core::{
    CommandSpec, CooldownSpec, HandlerError, ResourceCost, ResourceKind, SavingThrow,
};

use crate::buffs::BuffCatalog;

pub fn specs(catalog: &BuffCatalog) -> Vec<CommandSpec> {
    let shocked = catalog.get("shocked").cloned();

    vec![
        CommandSpec::Cooldown(
            CooldownSpec::new("flamestrike")
                .global_cooldown()
                .potency(800)
                .saving_throw(SavingThrow::Reflex)
                .cost(ResourceCost::percent(ResourceKind::Mana, 20))
                .run(|ctx| {
                    ctx.execute_attack()?;
                    Ok(true)
                }),
        ),
        CommandSpec::Cooldown(
            CooldownSpec::new("icespike")
                .global_cooldown()
                .potency(200)
                .saving_throw(SavingThrow::Prudence)
                .run(|ctx| {
                    let roll = ctx.execute_attack()?;
                    if !roll.is_miss() {
                        // Siphon: 5% of max mana, plus 5% more per 100 levels.
                        let percent = 5 + 5 * ctx.level() / 100;
                        let restored = ctx.restore_self_percent(ResourceKind::Mana, percent);
                        if restored > 0 {
                            ctx.send(format!("Stolen warmth returns {restored} mana to you."));
                        }
                    }
                    Ok(true)
                }),
        ),
        CommandSpec::Cooldown(
            CooldownSpec::new("shock")
                .cooldown(Duration::from_secs(6))
                .cast_time(Duration::from_secs(3))
                .cast_message("You begin drawing a charge into your palms...")
                .potency(100)
                .saving_throw(SavingThrow::Will)
                .run(move |ctx| {
                    let roll = ctx.execute_attack()?;
                    if !roll.is_miss() {
                        let template = shocked.as_ref().ok_or_else(|| {
                            HandlerError::failed("buff catalog has no 'shocked' template")
                        })?;
                        let per_tick = (ctx.level() / 2).max(1);
                        let target = ctx.target_name().unwrap_or_default().to_string();
                        ctx.apply_effect_target(template.dot_effect(per_tick))?;
                        ctx.send(format!("Electricity clings to {target}."));
                    }
                    Ok(true)
                }),
        ),
    ]
}
