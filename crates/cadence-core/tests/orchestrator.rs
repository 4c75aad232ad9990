//! Integration tests: drive whole queue runs against a scripted remote on a
//! paused tokio clock, so lockout and escalation countdowns finish instantly.

mod common;

use std::sync::Arc;
use std::time::Duration;

use cadence_core::config::CadenceConfig;
use cadence_core::cooldown::{CooldownStatus, GlobalCooldown};
use cadence_core::ledger::{Hold, HoldKind};
use cadence_core::queue_db::{ItemStatus, QueueStatus};
use cadence_core::remote::RemoteError;
use cadence_core::retry::MAX_COOLDOWN_SECS;
use cadence_core::scheduler::{apply_decision, Decision, Orchestrator, PauseCause, Phase, RunOutcome};
use cadence_core::store::QueueStore;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

use common::memory_store::{MemoryStore, QUEUE};
use common::scripted_remote::{handle_for, Call, ScriptedRemote};

fn orchestrator(
    store: &Arc<MemoryStore>,
    remote: &Arc<ScriptedRemote>,
    cfg: &CadenceConfig,
) -> (Orchestrator, UnboundedReceiver<Phase>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let orch = Orchestrator::new(store.clone(), remote.clone(), GlobalCooldown::new(), cfg)
        .with_phase_observer(tx);
    (orch, rx)
}

fn drain(rx: &mut UnboundedReceiver<Phase>) -> Vec<Phase> {
    let mut phases = Vec::new();
    while let Ok(p) = rx.try_recv() {
        phases.push(p);
    }
    phases
}

/// Collect phases on a separate task and request pause whenever `trigger` matches.
fn pause_on<F>(orch: &Orchestrator, mut rx: UnboundedReceiver<Phase>, trigger: F) -> JoinHandle<Vec<Phase>>
where
    F: Fn(&Phase) -> bool + Send + 'static,
{
    let flag = orch.pause_flag().clone();
    tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(p) = rx.recv().await {
            if trigger(&p) {
                flag.request();
            }
            seen.push(p);
        }
        seen
    })
}

#[tokio::test(start_paused = true)]
async fn generic_failures_retry_then_queue_completes() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b", "c"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("b", "internal server error");
    remote.fail_upload("b", "internal server error");

    let (orch, mut rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    let outcome = orch.run(QUEUE).await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    let ledger = store.ledger();
    assert_eq!(ledger.current_index, 3);
    assert_eq!(ledger.consecutive_auto_retries, 0);
    assert_eq!(ledger.resume_index, None);
    assert!(!ledger.is_paused);
    assert!(store
        .snapshot_items()
        .iter()
        .all(|i| i.status == ItemStatus::Completed));
    assert_eq!(store.status(), QueueStatus::Completed);

    assert_eq!(remote.uploads_of("b"), 3);
    assert_eq!(remote.archives_of("b"), 1);

    let phases = drain(&mut rx);
    assert_eq!(phases.first(), Some(&Phase::Idle));
    assert_eq!(phases.last(), Some(&Phase::Completed));
    for attempt in [1, 2] {
        assert!(phases
            .iter()
            .any(|p| matches!(p, Phase::AutoRetrying { attempt: a, .. } if *a == attempt)));
    }
    assert!(phases.contains(&Phase::Archiving { item: 3 }));
}

#[tokio::test(start_paused = true)]
async fn bot_detection_counts_down_lockout_then_pauses() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b", "c"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("b", "challenge_required: suspicious login");

    let (orch, mut rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    let started = tokio::time::Instant::now();
    let outcome = orch.run(QUEUE).await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Paused {
            resume_index: 1,
            cause: PauseCause::Lockout
        }
    );
    assert!(started.elapsed() >= Duration::from_secs(900));

    let phases = drain(&mut rx);
    let lockout: Vec<u64> = phases
        .iter()
        .filter_map(|p| match p {
            Phase::LockedOut { remaining } => Some(*remaining),
            _ => None,
        })
        .collect();
    assert_eq!(lockout.first(), Some(&900));
    assert_eq!(lockout.last(), Some(&1));
    assert_eq!(lockout.len(), 900);
    assert_eq!(phases.last(), Some(&Phase::Paused));

    let ledger = store.ledger();
    assert_eq!(ledger.resume_index, Some(1));
    assert!(ledger.is_paused);
    assert_eq!(ledger.hold, None);

    let items = store.snapshot_items();
    assert_eq!(items[0].status, ItemStatus::Completed);
    assert_ne!(items[1].status, ItemStatus::Completed);
    assert_eq!(remote.uploads_of("b"), 1);
    assert_eq!(remote.uploads_of("c"), 0);
    assert_eq!(store.status(), QueueStatus::Paused);
}

#[tokio::test(start_paused = true)]
async fn pause_during_inter_item_wait_resumes_at_next_item() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b"]));
    let remote = Arc::new(ScriptedRemote::new());
    let cfg = common::fixed_pacing_config(5, 200);

    let (orch, rx) = orchestrator(&store, &remote, &cfg);
    let watcher = pause_on(&orch, rx, |p| {
        *p == Phase::WaitingNextItem {
            next: 2,
            remaining: 50,
        }
    });
    let outcome = orch.run(QUEUE).await.unwrap();
    drop(orch);
    let seen = watcher.await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Paused {
            resume_index: 1,
            cause: PauseCause::Requested
        }
    );
    assert!(!seen.contains(&Phase::WaitingNextItem {
        next: 2,
        remaining: 49
    }));
    assert_eq!(
        remote.calls(),
        vec![Call::Upload("a".into()), Call::Archive(handle_for("a"))]
    );
    assert_eq!(store.ledger().resume_index, Some(1));

    let (orch, _rx) = orchestrator(&store, &remote, &cfg);
    assert_eq!(orch.resume(QUEUE).await.unwrap(), RunOutcome::Completed);
    assert_eq!(remote.uploads_of("a"), 1);
    assert_eq!(remote.uploads_of("b"), 1);
}

#[tokio::test(start_paused = true)]
async fn resume_index_skips_earlier_items() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b", "c", "d"]));
    let remote = Arc::new(ScriptedRemote::new());
    let mut ledger = store.ledger();
    ledger.resume_index = Some(2);
    ledger.is_paused = true;
    store.set_ledger(ledger);

    let (orch, _rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    assert_eq!(orch.resume(QUEUE).await.unwrap(), RunOutcome::Completed);

    for payload in ["a", "b"] {
        assert_eq!(remote.uploads_of(payload), 0);
        assert_eq!(remote.archives_of(payload), 0);
    }
    assert_eq!(remote.archives_of("c"), 1);
    assert_eq!(remote.archives_of("d"), 1);
}

#[tokio::test(start_paused = true)]
async fn resume_from_explicit_index() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b", "c"]));
    let remote = Arc::new(ScriptedRemote::new());

    let (orch, _rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    assert!(orch.resume_from(QUEUE, 3).await.is_err());
    assert_eq!(orch.resume_from(QUEUE, 2).await.unwrap(), RunOutcome::Completed);
    assert_eq!(remote.calls(), vec![Call::Upload("c".into()), Call::Archive(handle_for("c"))]);
}

#[tokio::test(start_paused = true)]
async fn session_expired_is_never_retried() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("a", "login_required");

    let (orch, mut rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    let outcome = orch.run(QUEUE).await.unwrap();
    assert_eq!(outcome, RunOutcome::SessionExpired { resume_index: 0 });

    assert_eq!(remote.calls(), vec![Call::Upload("a".into())]);
    let phases = drain(&mut rx);
    assert_eq!(phases.last(), Some(&Phase::SessionExpired));
    assert!(!phases
        .iter()
        .any(|p| matches!(p, Phase::AutoRetrying { .. })));

    let items = store.snapshot_items();
    assert_eq!(items[0].status, ItemStatus::Failed);
    assert_eq!(items[0].last_error.as_deref(), Some("login_required"));
    assert_eq!(store.status(), QueueStatus::Error);
    assert_eq!(store.ledger().resume_index, Some(0));
}

#[tokio::test(start_paused = true)]
async fn consecutive_retries_at_limit_escalate() {
    let store = Arc::new(MemoryStore::with_payloads(&["a"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("a", "connection reset by peer");
    let mut ledger = store.ledger();
    ledger.consecutive_auto_retries = 3;
    store.set_ledger(ledger);

    let (orch, mut rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    let outcome = orch.run(QUEUE).await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Paused {
            resume_index: 0,
            cause: PauseCause::Escalation
        }
    );

    let phases = drain(&mut rx);
    assert!(phases.contains(&Phase::EscalatedPause { remaining: 300 }));
    assert!(!phases.iter().any(|p| matches!(
        p,
        Phase::AutoRetrying { .. } | Phase::WaitingNetwork { .. }
    )));
    assert_eq!(remote.uploads_of("a"), 1);
    assert!(!remote.calls().contains(&Call::Probe));
}

#[tokio::test(start_paused = true)]
async fn per_item_attempts_exhaust_into_escalation() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b"]));
    let remote = Arc::new(ScriptedRemote::new());
    for _ in 0..3 {
        remote.fail_upload("a", "internal server error");
    }

    let (orch, _rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    let outcome = orch.run(QUEUE).await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Paused {
            resume_index: 0,
            cause: PauseCause::Escalation
        }
    );
    assert_eq!(remote.uploads_of("a"), 3);
    assert_eq!(remote.uploads_of("b"), 0);
    assert_eq!(store.ledger().consecutive_auto_retries, 2);
}

#[tokio::test(start_paused = true)]
async fn network_failure_waits_for_probe_then_retries() {
    let store = Arc::new(MemoryStore::with_payloads(&["a"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("a", "network is unreachable");
    remote.probe_result(Err(RemoteError::new("offline")));
    remote.probe_result(Err(RemoteError::new("offline")));

    let (orch, mut rx) = orchestrator(&store, &remote, &common::fixed_pacing_config(5, 160));
    assert_eq!(orch.run(QUEUE).await.unwrap(), RunOutcome::Completed);

    let probes = remote.calls().iter().filter(|c| **c == Call::Probe).count();
    assert_eq!(probes, 3);
    assert!(drain(&mut rx).contains(&Phase::WaitingNetwork { attempt: 1 }));
    assert_eq!(remote.uploads_of("a"), 2);
    assert_eq!(store.ledger().consecutive_auto_retries, 0);
}

#[tokio::test(start_paused = true)]
async fn cooldown_failure_waits_declared_time_plus_margin() {
    let store = Arc::new(MemoryStore::with_payloads(&["a"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("a", "Please wait 1m 30s before posting again");

    let (orch, mut rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    assert_eq!(orch.run(QUEUE).await.unwrap(), RunOutcome::Completed);

    let phases = drain(&mut rx);
    assert!(phases.contains(&Phase::AutoRetrying {
        remaining: 120,
        attempt: 1
    }));
    assert!(!phases.contains(&Phase::AutoRetrying {
        remaining: 121,
        attempt: 1
    }));
}

#[tokio::test(start_paused = true)]
async fn active_cooldown_is_waited_out_before_first_upload() {
    let store = Arc::new(MemoryStore::with_payloads(&["a"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.set_cooldown(CooldownStatus::for_secs(40));

    let (orch, mut rx) = orchestrator(&store, &remote, &common::fixed_pacing_config(5, 160));
    let started = tokio::time::Instant::now();
    assert_eq!(orch.run(QUEUE).await.unwrap(), RunOutcome::Completed);
    assert!(started.elapsed() >= Duration::from_secs(45));

    let phases = drain(&mut rx);
    assert_eq!(phases[1], Phase::Cooldown { remaining: 40 });
    let first_upload = phases
        .iter()
        .position(|p| *p == Phase::Uploading { item: 1 })
        .unwrap();
    let last_cooldown = phases
        .iter()
        .rposition(|p| matches!(p, Phase::Cooldown { .. }))
        .unwrap();
    assert!(last_cooldown < first_upload);
}

#[tokio::test(start_paused = true)]
async fn locked_out_account_stops_before_any_call() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.set_locked_out(true);

    let (orch, _rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    let outcome = orch.run(QUEUE).await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Paused {
            resume_index: 0,
            cause: PauseCause::AccountLocked
        }
    );
    assert!(remote.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn paused_queue_stays_paused_until_resumed() {
    let store = Arc::new(MemoryStore::with_payloads(&["a"]));
    let remote = Arc::new(ScriptedRemote::new());
    let mut ledger = store.ledger();
    ledger.is_paused = true;
    store.set_ledger(ledger);

    let (orch, _rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    assert!(matches!(
        orch.run(QUEUE).await.unwrap(),
        RunOutcome::Paused {
            cause: PauseCause::Requested,
            ..
        }
    ));
    assert!(remote.calls().is_empty());

    assert_eq!(orch.resume(QUEUE).await.unwrap(), RunOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn rejected_item_can_be_skipped() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b", "c"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("b", "unsupported media format");

    let (orch, mut rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    let outcome = orch.run(QUEUE).await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::ItemRejected {
            index: 1,
            reason: "unsupported media format".into()
        }
    );
    assert_eq!(drain(&mut rx).last(), Some(&Phase::ItemRejected { item: 2 }));
    assert_eq!(store.status(), QueueStatus::Error);

    let next = apply_decision(store.as_ref(), QUEUE, Decision::Skip).await.unwrap();
    assert_eq!(next, 2);
    assert_eq!(orch.resume(QUEUE).await.unwrap(), RunOutcome::Completed);

    let items = store.snapshot_items();
    assert_eq!(items[1].status, ItemStatus::Failed);
    assert_eq!(items[2].status, ItemStatus::Completed);
    assert_eq!(remote.uploads_of("b"), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_item_can_be_replaced() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("b", "image too large");

    let (orch, _rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    assert!(matches!(
        orch.run(QUEUE).await.unwrap(),
        RunOutcome::ItemRejected { index: 1, .. }
    ));

    let decision = Decision::Replace {
        payload: "b-small".into(),
    };
    assert_eq!(apply_decision(store.as_ref(), QUEUE, decision).await.unwrap(), 1);
    assert_eq!(orch.resume(QUEUE).await.unwrap(), RunOutcome::Completed);

    assert_eq!(remote.uploads_of("a"), 1);
    assert_eq!(remote.uploads_of("b-small"), 1);
    assert_eq!(remote.archives_of("b-small"), 1);
}

#[tokio::test(start_paused = true)]
async fn interrupted_lockout_is_finished_on_resume() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("b", "bot detected");
    let cfg = CadenceConfig::default();

    let (orch, rx) = orchestrator(&store, &remote, &cfg);
    let watcher = pause_on(&orch, rx, |p| *p == Phase::LockedOut { remaining: 600 });
    let outcome = orch.run(QUEUE).await.unwrap();
    drop(orch);
    watcher.await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Paused {
            resume_index: 1,
            cause: PauseCause::Requested
        }
    );
    assert_eq!(
        store.ledger().hold,
        Some(Hold {
            kind: HoldKind::Lockout,
            remaining_secs: 599
        })
    );

    let (orch, mut rx) = orchestrator(&store, &remote, &cfg);
    assert_eq!(orch.resume(QUEUE).await.unwrap(), RunOutcome::Completed);
    let phases = drain(&mut rx);
    assert_eq!(phases[1], Phase::LockedOut { remaining: 599 });
    assert_eq!(store.ledger().hold, None);
    assert_eq!(remote.uploads_of("b"), 2);
}

#[tokio::test(start_paused = true)]
async fn uploaded_item_is_only_archived() {
    let store = Arc::new(MemoryStore::with_payloads(&["a"]));
    let remote = Arc::new(ScriptedRemote::new());
    let id = store.snapshot_items()[0].id;
    store.record_upload(id, &handle_for("a")).await.unwrap();

    let (orch, _rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    assert_eq!(orch.run(QUEUE).await.unwrap(), RunOutcome::Completed);
    assert_eq!(remote.calls(), vec![Call::Archive(handle_for("a"))]);
}

#[tokio::test(start_paused = true)]
async fn declined_archive_retries_without_reupload() {
    let store = Arc::new(MemoryStore::with_payloads(&["a"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.archive_result("a", Ok(false));

    let (orch, _rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    assert_eq!(orch.run(QUEUE).await.unwrap(), RunOutcome::Completed);
    assert_eq!(remote.uploads_of("a"), 1);
    assert_eq!(remote.archives_of("a"), 2);
}

#[tokio::test(start_paused = true)]
async fn completed_items_are_skipped() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b", "c"]));
    let remote = Arc::new(ScriptedRemote::new());
    store.mark_completed(0);
    store.mark_completed(2);

    let (orch, _rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    assert_eq!(orch.run(QUEUE).await.unwrap(), RunOutcome::Completed);
    assert_eq!(
        remote.calls(),
        vec![Call::Upload("b".into()), Call::Archive(handle_for("b"))]
    );
    assert_eq!(store.ledger().current_index, 3);
}

#[tokio::test(start_paused = true)]
async fn pause_during_pre_archive_delay_keeps_handle() {
    let store = Arc::new(MemoryStore::with_payloads(&["a", "b"]));
    let remote = Arc::new(ScriptedRemote::new());
    let cfg = common::fixed_pacing_config(5, 160);

    let (orch, rx) = orchestrator(&store, &remote, &cfg);
    let watcher = pause_on(&orch, rx, |p| *p == Phase::Uploading { item: 1 });
    let outcome = orch.run(QUEUE).await.unwrap();
    drop(orch);
    let seen = watcher.await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Paused {
            resume_index: 0,
            cause: PauseCause::Requested
        }
    );
    assert!(!seen.contains(&Phase::Archiving { item: 1 }));
    assert_eq!(remote.calls(), vec![Call::Upload("a".into())]);
    let items = store.snapshot_items();
    assert_eq!(items[0].status, ItemStatus::Uploaded);
    assert_eq!(items[0].remote_handle.as_deref(), Some("h-a"));
    assert_eq!(store.ledger().resume_index, Some(0));

    let (orch, _rx) = orchestrator(&store, &remote, &cfg);
    assert_eq!(orch.resume(QUEUE).await.unwrap(), RunOutcome::Completed);
    assert_eq!(remote.uploads_of("a"), 1);
    assert_eq!(remote.archives_of("a"), 1);
    assert_eq!(remote.archives_of("b"), 1);
}

#[tokio::test(start_paused = true)]
async fn pause_during_retry_countdown_stops_before_next_attempt() {
    let store = Arc::new(MemoryStore::with_payloads(&["a"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("a", "internal server error");
    let cfg = CadenceConfig::default();

    let (orch, rx) = orchestrator(&store, &remote, &cfg);
    let watcher = pause_on(&orch, rx, |p| {
        matches!(p, Phase::AutoRetrying { attempt: 1, .. })
    });
    let outcome = orch.run(QUEUE).await.unwrap();
    drop(orch);
    watcher.await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Paused {
            resume_index: 0,
            cause: PauseCause::Requested
        }
    );
    assert_eq!(remote.calls(), vec![Call::Upload("a".into())]);
    let ledger = store.ledger();
    assert_eq!(ledger.resume_index, Some(0));
    assert_eq!(ledger.consecutive_auto_retries, 0);
    assert_eq!(
        store.snapshot_items()[0].last_error.as_deref(),
        Some("internal server error")
    );

    let (orch, _rx) = orchestrator(&store, &remote, &cfg);
    assert_eq!(orch.resume(QUEUE).await.unwrap(), RunOutcome::Completed);
    assert_eq!(remote.uploads_of("a"), 2);
}

#[tokio::test(start_paused = true)]
async fn pause_during_network_wait_stops_polling() {
    let store = Arc::new(MemoryStore::with_payloads(&["a"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("a", "network is unreachable");
    for _ in 0..3 {
        remote.probe_result(Err(RemoteError::new("offline")));
    }
    let cfg = common::fixed_pacing_config(5, 160);

    let (orch, rx) = orchestrator(&store, &remote, &cfg);
    let watcher = pause_on(&orch, rx, |p| *p == Phase::WaitingNetwork { attempt: 1 });
    let outcome = orch.run(QUEUE).await.unwrap();
    drop(orch);
    watcher.await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Paused {
            resume_index: 0,
            cause: PauseCause::Requested
        }
    );
    assert_eq!(remote.calls(), vec![Call::Upload("a".into()), Call::Probe]);
    assert_eq!(store.ledger().resume_index, Some(0));

    let (orch, _rx) = orchestrator(&store, &remote, &cfg);
    assert_eq!(orch.resume(QUEUE).await.unwrap(), RunOutcome::Completed);
    let connectivity_checks = remote.calls().iter().filter(|c| **c == Call::Probe).count();
    assert_eq!(connectivity_checks, 1);
    assert_eq!(remote.uploads_of("a"), 2);
}

#[tokio::test(start_paused = true)]
async fn absurd_cooldown_message_is_clamped_not_fatal() {
    let store = Arc::new(MemoryStore::with_payloads(&["a"]));
    let remote = Arc::new(ScriptedRemote::new());
    remote.fail_upload("a", "please wait 200000000000000000m");

    let (orch, mut rx) = orchestrator(&store, &remote, &CadenceConfig::default());
    assert_eq!(orch.run(QUEUE).await.unwrap(), RunOutcome::Completed);
    assert!(drain(&mut rx).contains(&Phase::AutoRetrying {
        remaining: MAX_COOLDOWN_SECS + 30,
        attempt: 1
    }));
    assert_eq!(remote.uploads_of("a"), 2);
}
