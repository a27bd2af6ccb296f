//! Racial and utility cooldowns: long timers, big swings.

use std::time::Duration;

use combat_core::{
    CommandSpec, CooldownSpec, HandlerError, ResourceCost, ResourceKind,
};

use crate::buffs::{BuffCatalog, BuffTemplate};

fn require<'a>(
    template: &'a Option<BuffTemplate>,
    name: &str,
) -> Result<&'a BuffTemplate, HandlerError> {
    template
        .as_ref()
        .ok_or_else(|| HandlerError::failed(format!("buff catalog has no '{name}' template")))
}

pub fn specs(catalog: &BuffCatalog) -> Vec<CommandSpec> {
    let stunned = catalog.get("stunned").cloned();
    let concentrating = catalog.get("concentrating").cloned();
    let vanished = catalog.get("vanished").cloned();

    vec![
        CommandSpec::Cooldown(
            CooldownSpec::new("coup")
                .display_name("coup de grace")
                .cooldown(Duration::from_secs(120))
                .potency(1_000)
                .cost(ResourceCost::percent(ResourceKind::Stamina, 10))
                .target_when(|target| target.health_percent() < 30)
                .run(|ctx| {
                    ctx.execute_attack()?;
                    Ok(true)
                }),
        ),
        CommandSpec::Cooldown(
            CooldownSpec::new("skullknock")
                .cooldown(Duration::from_secs(180))
                .potency(150)
                .run(move |ctx| {
                    let roll = ctx.execute_attack()?;
                    if !roll.is_miss() {
                        let template = require(&stunned, "stunned")?;
                        let target = ctx.target_name().unwrap_or_default().to_string();
                        ctx.apply_effect_target(template.effect())?;
                        ctx.send(format!("{target} staggers, stunned by the blow!"));
                    }
                    Ok(true)
                }),
        ),
        CommandSpec::Cooldown(
            CooldownSpec::new("concentrate")
                .cooldown(Duration::from_secs(180))
                .no_target()
                .run(move |ctx| {
                    let template = require(&concentrating, "concentrating")?;
                    ctx.apply_effect_self(template.effect())?;
                    ctx.send("You clear your mind and focus intently.");
                    Ok(true)
                }),
        ),
        CommandSpec::Cooldown(
            CooldownSpec::new("vanish")
                .cooldown(Duration::from_secs(180))
                .no_target()
                .run(move |ctx| {
                    let template = require(&vanished, "vanished")?;
                    ctx.apply_effect_self(template.effect())?;
                    ctx.send("You slip from sight.");
                    Ok(true)
                }),
        ),
        CommandSpec::Cooldown(
            CooldownSpec::new("aetherflow")
                .cooldown(Duration::from_secs(300))
                .no_target()
                .run(|ctx| {
                    let restored = ctx.restore_self_percent(ResourceKind::Mana, 50);
                    ctx.send(format!("Aether floods back into you ({restored} mana)."));
                    Ok(true)
                }),
        ),
        CommandSpec::Cooldown(
            CooldownSpec::new("survivor")
                .cooldown(Duration::from_secs(300))
                .no_target()
                .run(|ctx| {
                    ctx.restore_self_percent(ResourceKind::Health, 50);
                    ctx.restore_self_percent(ResourceKind::Stamina, 50);
                    ctx.send("You grit your teeth and refuse to fall.");
                    Ok(true)
                }),
        ),
    ]
}
