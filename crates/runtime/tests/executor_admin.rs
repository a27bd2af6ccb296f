//! Commit policies, buff scaling, hot reload, and persistence.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;

use combat_core::{
    ActionRegistry, ActorId, ActorStats, CommitPolicy, CooldownSpec, ResourceCost, ResourceKind,
    ResourcePool, SplitMixRng,
};
use runtime::{
    ActorSession, CombatExecutor, InMemoryActorRepository, RuntimeError, StaticTargetResolver,
    TargetError, TargetResolver,
};

const KAEL: ActorId = ActorId(1);
const RAT: ActorId = ActorId(2);

fn executor_with(registry: ActionRegistry) -> Arc<CombatExecutor> {
    let executor = CombatExecutor::builder(registry)
        .target_resolver(Arc::new(StaticTargetResolver::new().with("rat", RAT)))
        .rng(Box::new(SplitMixRng::new(11)))
        .build();
    executor.add_actor(
        KAEL,
        ActorSession::new(
            "Kael",
            ActorStats::new(30, 50, 20, 10, 40),
            ResourcePool::full(200, 20, 100),
        ),
    );
    executor.add_actor(
        RAT,
        ActorSession::new(
            "Rat",
            ActorStats::new(1, 5, 5, 5, 5),
            ResourcePool::full(100, 10, 10),
        ),
    );
    executor
        .into()
}

fn stock_executor() -> Arc<CombatExecutor> {
    let (registry, _config) = combat_content::stock_setup().unwrap();
    executor_with(registry)
}

/// Zero potency can never beat armor class, so this action always misses.
fn sure_miss(name: &str, policy: CommitPolicy) -> combat_core::ActionDefinition {
    CooldownSpec::new(name)
        .cooldown(Duration::from_secs(10))
        .potency(0)
        .cost(ResourceCost::fixed(ResourceKind::Stamina, 5))
        .commit_policy(policy)
        .run(|ctx| {
            ctx.execute_attack()?;
            Ok(true)
        })
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn miss_still_spends_costs_and_commits_under_default_policy() {
    let (mut registry, _config) = combat_content::stock_setup().unwrap();
    registry
        .register(sure_miss("fumble", CommitPolicy::Always))
        .unwrap();
    let executor = executor_with(registry);

    let resolution = executor
        .invoke(KAEL, "fumble", Some("rat"))
        .await
        .unwrap()
        .expect("a miss still resolves");
    assert!(!resolution.is_hit());
    assert_eq!(resolution.damage, 0);

    let stamina = executor
        .inspect(KAEL, |s| s.pools.stamina.current)
        .await
        .unwrap();
    assert_eq!(stamina, 95, "the attempt is paid for");
    let cooling = executor.cooling(KAEL).await.unwrap();
    assert!(cooling.iter().any(|(name, _)| name == "fumble"));
}

#[tokio::test(start_paused = true)]
async fn on_hit_only_policy_refunds_a_miss() {
    let (mut registry, _config) = combat_content::stock_setup().unwrap();
    registry
        .register(sure_miss("cautious", CommitPolicy::OnHitOnly))
        .unwrap();
    let executor = executor_with(registry);

    executor
        .invoke(KAEL, "cautious", Some("rat"))
        .await
        .unwrap()
        .expect("the miss still resolves");

    let stamina = executor
        .inspect(KAEL, |s| s.pools.stamina.current)
        .await
        .unwrap();
    assert_eq!(stamina, 100, "the miss is refunded");
    assert!(executor.cooling(KAEL).await.unwrap().is_empty());
    // With no commit there is no completion to combo from either.
    let last = executor
        .inspect(KAEL, |s| s.cooldowns.last_completed().map(|(n, _)| n.to_string()))
        .await
        .unwrap();
    assert_eq!(last, None);
}

#[tokio::test(start_paused = true)]
async fn concentrating_buff_doubles_resolved_potency() {
    let executor = stock_executor();

    executor
        .invoke(KAEL, "concentrate", None)
        .await
        .unwrap()
        .expect("concentrate resolves");

    tokio::time::advance(Duration::from_secs(2)).await;
    let resolution = executor
        .invoke(KAEL, "flurry", Some("rat"))
        .await
        .unwrap()
        .expect("flurry resolves");
    assert_eq!(resolution.potency, 300, "150 base doubled while concentrating");

    // Once the buff lapses, potency returns to base.
    tokio::time::advance(Duration::from_secs(60)).await;
    let resolution = executor
        .invoke(KAEL, "flurry", Some("rat"))
        .await
        .unwrap()
        .expect("flurry resolves");
    assert_eq!(resolution.potency, 150);
}

#[tokio::test(start_paused = true)]
async fn level_gate_rejects_unqualified_actors() {
    let (mut registry, _config) = combat_content::stock_setup().unwrap();
    registry
        .register(
            CooldownSpec::new("mastery strike")
                .level_required(50)
                .run(|ctx| {
                    ctx.execute_attack()?;
                    Ok(true)
                })
                .build()
                .unwrap(),
        )
        .unwrap();
    let executor = executor_with(registry);

    let err = executor
        .invoke(KAEL, "mastery strike", Some("rat"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::LevelTooLow { required: 50, .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn insufficient_resources_reject_before_any_deduction() {
    let executor = stock_executor();
    executor.add_actor(KAEL, {
        let mut pool = ResourcePool::full(200, 20, 100);
        pool.mana.current = 3;
        ActorSession::new("Kael", ActorStats::new(30, 50, 20, 10, 40), pool)
    });

    // flamestrike needs 4 mana (20% of 20); only 3 remain.
    let err = executor
        .invoke(KAEL, "flamestrike", Some("rat"))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Resources(_)));

    let mana = executor
        .inspect(KAEL, |s| s.pools.mana.current)
        .await
        .unwrap();
    assert_eq!(mana, 3, "a rejected invocation deducts nothing");
    assert!(executor.cooling(KAEL).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn hot_reload_swaps_the_action_set_atomically() {
    let executor = stock_executor();

    executor
        .invoke(KAEL, "flurry", Some("rat"))
        .await
        .unwrap()
        .expect("stock flurry resolves");

    let mut next = ActionRegistry::new();
    next.register(
        CooldownSpec::new("headbutt")
            .global_cooldown()
            .run(|ctx| {
                ctx.execute_attack()?;
                Ok(true)
            })
            .build()
            .unwrap(),
    )
    .unwrap();
    executor.reload(next);

    tokio::time::advance(Duration::from_secs(2)).await;
    let err = executor
        .invoke(KAEL, "flurry", Some("rat"))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Registry(_)));
    executor
        .invoke(KAEL, "headbutt", Some("rat"))
        .await
        .unwrap()
        .expect("reloaded action resolves");
}

#[tokio::test(start_paused = true)]
async fn target_resolver_may_inspect_sessions_mid_lookup() {
    // A live-world resolver scans the invoker's surroundings, which means
    // reading actor state. That must not find the invoker's session lock
    // already held.
    struct RoomScanResolver(OnceLock<Arc<CombatExecutor>>);

    #[async_trait]
    impl TargetResolver for RoomScanResolver {
        async fn resolve(&self, actor: ActorId, raw: &str) -> Result<ActorId, TargetError> {
            let executor = self.0.get().unwrap();
            executor
                .inspect(actor, |s| s.pools.health.current)
                .await
                .map_err(|_| TargetError::NoSuchTarget(raw.to_string()))?;
            match raw {
                "rat" => Ok(RAT),
                _ => Err(TargetError::NoSuchTarget(raw.to_string())),
            }
        }
    }

    let (registry, _config) = combat_content::stock_setup().unwrap();
    let resolver = Arc::new(RoomScanResolver(OnceLock::new()));
    let executor: Arc<CombatExecutor> = CombatExecutor::builder(registry)
        .target_resolver(resolver.clone())
        .rng(Box::new(SplitMixRng::new(11)))
        .build()
        .into();
    assert!(resolver.0.set(executor.clone()).is_ok());
    executor.add_actor(
        KAEL,
        ActorSession::new(
            "Kael",
            ActorStats::new(30, 50, 20, 10, 40),
            ResourcePool::full(200, 20, 100),
        ),
    );
    executor.add_actor(
        RAT,
        ActorSession::new(
            "Rat",
            ActorStats::new(1, 5, 5, 5, 5),
            ResourcePool::full(100, 10, 10),
        ),
    );

    executor
        .invoke(KAEL, "flurry", Some("rat"))
        .await
        .unwrap()
        .expect("flurry resolves through the inspecting resolver");
}

#[tokio::test(start_paused = true)]
async fn actor_state_persists_across_remove_and_restore() {
    let (registry, _config) = combat_content::stock_setup().unwrap();
    let repository = Arc::new(InMemoryActorRepository::new());
    let executor: Arc<CombatExecutor> = CombatExecutor::builder(registry)
        .target_resolver(Arc::new(StaticTargetResolver::new().with("rat", RAT)))
        .repository(repository.clone())
        .rng(Box::new(SplitMixRng::new(3)))
        .build()
        .into();
    executor.add_actor(
        KAEL,
        ActorSession::new(
            "Kael",
            ActorStats::new(30, 50, 20, 10, 40),
            ResourcePool::full(200, 20, 100),
        ),
    );
    executor.add_actor(
        RAT,
        ActorSession::new(
            "Rat",
            ActorStats::new(1, 5, 5, 5, 5),
            ResourcePool::full(100, 10, 10),
        ),
    );

    // Resolution auto-persists when a repository is configured.
    executor
        .invoke(KAEL, "flamestrike", Some("rat"))
        .await
        .unwrap()
        .expect("flamestrike resolves");

    assert!(executor.remove_actor(KAEL));
    assert!(matches!(
        executor.inspect(KAEL, |_| ()).await,
        Err(RuntimeError::UnknownActor(_))
    ));

    assert!(executor.restore_actor(KAEL).await.unwrap());
    let mana = executor
        .inspect(KAEL, |s| s.pools.mana.current)
        .await
        .unwrap();
    assert_eq!(mana, 16, "spent mana survives the round trip");

    // The persisted global cooldown still gates the restored actor.
    let err = executor
        .invoke(KAEL, "flurry", Some("rat"))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Schedule(_)));
}
