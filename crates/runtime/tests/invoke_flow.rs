//! End-to-end invocation pipeline tests against the stock content set.
//!
//! All tests run under paused tokio time, so cast timers and cooldowns
//! elapse through explicit `advance`/auto-advance and every run is
//! deterministic (rolls come from a seeded generator).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use combat_core::{ActorId, ActorStats, ResourcePool, ScheduleError, SplitMixRng};
use runtime::{
    ActorSession, CombatExecutor, MessageSink, RuntimeError, StaticTargetResolver,
};

const KAEL: ActorId = ActorId(1);
const RAT: ActorId = ActorId(2);

#[derive(Default)]
struct RecordingSink(Mutex<Vec<(ActorId, String)>>);

impl RecordingSink {
    fn lines_for(&self, actor: ActorId) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == actor)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_to(&self, actor: ActorId, text: &str) {
        self.0.lock().unwrap().push((actor, text.to_string()));
    }
}

fn kael_stats() -> ActorStats {
    // Strong enough that physical rolls against the rat always land.
    ActorStats::new(30, 50, 20, 10, 40)
}

fn rat_stats() -> ActorStats {
    ActorStats::new(1, 5, 5, 5, 5)
}

fn setup() -> (Arc<CombatExecutor>, Arc<RecordingSink>) {
    let (registry, config) = combat_content::stock_setup().unwrap();
    let sink = Arc::new(RecordingSink::default());
    let executor = CombatExecutor::builder(registry)
        .config(config)
        .target_resolver(Arc::new(StaticTargetResolver::new().with("rat", RAT)))
        .message_sink(sink.clone())
        .rng(Box::new(SplitMixRng::new(7)))
        .build();
    executor.add_actor(
        KAEL,
        ActorSession::new("Kael", kael_stats(), ResourcePool::full(200, 20, 100)),
    );
    executor.add_actor(
        RAT,
        ActorSession::new("Rat", rat_stats(), ResourcePool::full(100, 10, 10)),
    );
    (Arc::new(executor), sink)
}

#[tokio::test(start_paused = true)]
async fn cooldown_rejects_second_invoke_with_remaining_time() {
    let (executor, sink) = setup();
    // Put the rat low enough for coup's admission predicate.
    wound_rat(&executor);

    executor
        .invoke(KAEL, "coup", Some("rat"))
        .await
        .unwrap()
        .expect("first coup resolves");

    let err = executor.invoke(KAEL, "coup", Some("rat")).await.unwrap_err();
    match err {
        RuntimeError::Schedule(ScheduleError::OnCooldown { action, remaining }) => {
            assert_eq!(action, "coup");
            assert_eq!(remaining, Duration::from_secs(120));
        }
        other => panic!("expected OnCooldown, got {other:?}"),
    }
    assert!(
        sink.lines_for(KAEL)
            .iter()
            .any(|line| line.contains("not ready"))
    );
}

/// Replace the rat with a copy below 30% health, for coup's predicate.
fn wound_rat(executor: &CombatExecutor) {
    let mut pool = ResourcePool::full(100, 10, 10);
    pool.health.current = 20;
    executor.add_actor(RAT, ActorSession::new("Rat", rat_stats(), pool));
}

#[tokio::test(start_paused = true)]
async fn global_cooldown_is_shared_across_global_actions() {
    let (executor, sink) = setup();

    executor
        .invoke(KAEL, "flurry", Some("rat"))
        .await
        .unwrap()
        .expect("flurry resolves");

    // A different GCD action is blocked while the shared timer runs.
    let err = executor
        .invoke(KAEL, "slash", Some("rat"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Schedule(ScheduleError::OnCooldown { ref action, .. }) if action == "slash"
    ));
    assert!(
        sink.lines_for(KAEL)
            .iter()
            .any(|line| line.contains("not ready"))
    );

    tokio::time::advance(Duration::from_secs(2)).await;
    executor
        .invoke(KAEL, "slash", Some("rat"))
        .await
        .unwrap()
        .expect("slash resolves after the global cooldown");
}

#[tokio::test(start_paused = true)]
async fn timed_actions_run_free_of_the_global_window() {
    let (executor, _sink) = setup();
    wound_rat(&executor);

    // Coup carries its own 120s timer; completing it leaves the global
    // cooldown untouched, so a GCD action starts with no wait at all.
    executor
        .invoke(KAEL, "coup", Some("rat"))
        .await
        .unwrap()
        .expect("coup resolves");
    executor
        .invoke(KAEL, "flurry", Some("rat"))
        .await
        .unwrap()
        .expect("flurry resolves right after a timed action");

    // And the other way around: inside flurry's global window a timed
    // action is still admissible.
    executor
        .invoke(KAEL, "skullknock", Some("rat"))
        .await
        .unwrap()
        .expect("skullknock resolves inside the global window");
}

#[tokio::test(start_paused = true)]
async fn combo_chain_upgrades_potency_end_to_end() {
    let (executor, _sink) = setup();

    let opener = executor
        .invoke(KAEL, "flurry", Some("rat"))
        .await
        .unwrap()
        .expect("flurry resolves");
    assert!(!opener.combo);
    assert_eq!(opener.potency, 150);

    tokio::time::advance(Duration::from_secs(2)).await;
    let follow = executor
        .invoke(KAEL, "slash", Some("rat"))
        .await
        .unwrap()
        .expect("slash resolves");
    assert!(follow.combo);
    assert_eq!(follow.potency, 225);

    tokio::time::advance(Duration::from_secs(2)).await;
    let finisher = executor
        .invoke(KAEL, "riposte", Some("rat"))
        .await
        .unwrap()
        .expect("riposte resolves");
    assert!(finisher.combo);
    assert_eq!(finisher.potency, 350);

    // Waiting out the window resets the chain to base potency.
    tokio::time::advance(Duration::from_secs(30)).await;
    let cold = executor
        .invoke(KAEL, "slash", Some("rat"))
        .await
        .unwrap()
        .expect("slash resolves");
    assert!(!cold.combo);
    assert_eq!(cold.potency, 150);
}

#[tokio::test(start_paused = true)]
async fn percent_costs_deduct_from_maximum_each_cast() {
    let (executor, _sink) = setup();

    // 20% of the 20-point maximum is 4, regardless of current mana.
    executor
        .invoke(KAEL, "flamestrike", Some("rat"))
        .await
        .unwrap()
        .expect("flamestrike resolves");
    let mana = executor
        .inspect(KAEL, |s| s.pools.mana.current)
        .await
        .unwrap();
    assert_eq!(mana, 16);

    tokio::time::advance(Duration::from_secs(2)).await;
    executor
        .invoke(KAEL, "flamestrike", Some("rat"))
        .await
        .unwrap()
        .expect("flamestrike resolves again");
    let mana = executor
        .inspect(KAEL, |s| s.pools.mana.current)
        .await
        .unwrap();
    assert_eq!(mana, 12);
}

#[tokio::test(start_paused = true)]
async fn interrupt_mid_cast_cancels_without_committing() {
    let (executor, sink) = setup();

    let casting = {
        let executor = executor.clone();
        tokio::spawn(async move { executor.invoke(KAEL, "shock", Some("rat")).await })
    };
    // Let the cast reach its suspension point.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(executor.interrupt(KAEL).await.unwrap());
    let result = casting.await.unwrap().unwrap();
    assert!(result.is_none(), "interrupted cast must not resolve");

    // Nothing committed: no cooldown, no in-flight cast, no damage.
    assert!(executor.cooling(KAEL).await.unwrap().is_empty());
    executor
        .inspect(KAEL, |s| assert!(s.cooldowns.casting().is_none()))
        .await
        .unwrap();
    let rat_health = executor
        .inspect(RAT, |s| s.pools.health.current)
        .await
        .unwrap();
    assert_eq!(rat_health, 100);
    assert!(
        sink.lines_for(KAEL)
            .iter()
            .any(|line| line.contains("concentration is broken"))
    );
    // Interrupting again is a no-op.
    assert!(!executor.interrupt(KAEL).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn completed_cast_resolves_and_applies_its_dot() {
    let (executor, sink) = setup();

    let casting = {
        let executor = executor.clone();
        tokio::spawn(async move { executor.invoke(KAEL, "shock", Some("rat")).await })
    };
    // Paused time auto-advances to the 3s cast timer once everything is
    // idle; 4 seconds of sleep comfortably covers it.
    tokio::time::sleep(Duration::from_secs(4)).await;

    let resolution = casting
        .await
        .unwrap()
        .unwrap()
        .expect("completed cast resolves");
    assert!(resolution.is_hit());
    assert!(resolution.effects_applied.contains(&"shocked".to_string()));

    let shocked = executor
        .inspect(RAT, |s| s.effects.has("shocked"))
        .await
        .unwrap();
    assert!(shocked);
    let cooling = executor.cooling(KAEL).await.unwrap();
    assert!(cooling.iter().any(|(name, _)| name == "shock"));
    assert!(
        sink.lines_for(KAEL)
            .iter()
            .any(|line| line.contains("drawing a charge"))
    );
}

#[tokio::test(start_paused = true)]
async fn unknown_input_and_missing_target_are_narrated_rejections() {
    let (executor, sink) = setup();

    let err = executor.invoke(KAEL, "zigzag", None).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Registry(_)));
    assert!(sink.lines_for(KAEL).iter().any(|line| line == "Huh?"));

    let err = executor.invoke(KAEL, "slash", None).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Target(_)));

    let err = executor
        .invoke(KAEL, "slash", Some("dragon"))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Target(_)));
    assert!(
        sink.lines_for(KAEL)
            .iter()
            .any(|line| line.contains("no 'dragon' here"))
    );
}

#[tokio::test(start_paused = true)]
async fn cooldowns_command_lists_running_timers_without_scheduling() {
    let (executor, sink) = setup();
    wound_rat(&executor);

    executor
        .invoke(KAEL, "coup", Some("rat"))
        .await
        .unwrap()
        .expect("coup resolves");

    // The plain command runs while coup's timer is live: it is not gated
    // by the scheduler and commits nothing.
    let result = executor.invoke(KAEL, "cooldowns", None).await.unwrap();
    assert!(result.is_some());
    let lines = sink.lines_for(KAEL);
    assert!(lines.iter().any(|line| line.contains("coup")));

    // Alias and prefix reach the same command.
    executor.invoke(KAEL, "cd", None).await.unwrap();
    executor.invoke(KAEL, "coo", None).await.unwrap();
}
