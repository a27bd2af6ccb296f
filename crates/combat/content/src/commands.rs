//! Plain commands with no scheduling surface.

use combat_core::{CommandSpec, SimpleSpec};

/// `cooldowns` (alias `cd`): list the actor's named cooldowns still running.
pub fn cooldowns_command() -> CommandSpec {
    CommandSpec::Simple(SimpleSpec::new("cooldowns").alias("cd").run(|ctx| {
        if ctx.cooling().is_empty() {
            ctx.send("All of your cooldowns are ready.");
            return Ok(true);
        }
        let now = ctx.now();
        let lines: Vec<String> = ctx
            .cooling()
            .iter()
            .map(|entry| {
                let remaining = entry.ready_at.saturating_since(now);
                format!("{:>4}s  {}", remaining.as_secs(), entry.action)
            })
            .collect();
        ctx.send("Cooldowns still running:");
        for line in lines {
            ctx.send(line);
        }
        Ok(true)
    }))
}
