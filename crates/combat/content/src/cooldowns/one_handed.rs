//! One-handed weapon skill: the flurry → slash → riposte chain.
//!
//! All three ride the global cooldown; the chain is expressed through combo
//! potency, so each link hits harder when invoked inside the window its
//! predecessor opened.

use combat_core::{CommandSpec, CooldownSpec, ResourceCost, ResourceKind};

fn strike(spec: CooldownSpec) -> CommandSpec {
    CommandSpec::Cooldown(spec.run(|ctx| {
        ctx.execute_attack()?;
        Ok(true)
    }))
}

pub fn specs() -> Vec<CommandSpec> {
    vec![
        strike(
            CooldownSpec::new("flurry")
                .display_name("flurry of blows")
                .global_cooldown()
                .potency(150)
                .cost(ResourceCost::percent(ResourceKind::Stamina, 2)),
        ),
        strike(
            CooldownSpec::new("slash")
                .global_cooldown()
                .potency(150)
                .combo(225, &["flurry"])
                .cost(ResourceCost::percent(ResourceKind::Stamina, 4)),
        ),
        strike(
            CooldownSpec::new("riposte")
                .global_cooldown()
                .potency(150)
                .combo(350, &["slash"])
                .cost(ResourceCost::percent(ResourceKind::Stamina, 6)),
        ),
    ]
}
