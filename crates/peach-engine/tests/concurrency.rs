//! Several engines on one database file, racing from separate threads.

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use peach_engine::{EngineConfig, MatchEngine, Notifier, PeachEvent, RipenResult};
use peach_shared::UserId;
use peach_store::LikeOutcome;

use common::{engines_on_file, start_clock, user};

fn spawn_all<T, F>(engines: Vec<MatchEngine>, work: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize, &MatchEngine) -> T + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(engines.len()));
    let work = Arc::new(work);
    let handles: Vec<_> = engines
        .into_iter()
        .enumerate()
        .map(|(i, engine)| {
            let barrier = barrier.clone();
            let work = work.clone();
            thread::spawn(move || {
                barrier.wait();
                work(i, &engine)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn concurrent_likes_never_exceed_the_daily_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("peach.db");
    let config = EngineConfig {
        daily_like_limit: 5,
        ..EngineConfig::default()
    };
    let clock = start_clock();
    let notifier = Notifier::new(256);

    let mut engines = engines_on_file(&path, &config, &clock, &notifier, 5);
    let actor = user(&engines[0], "actor");
    let targets: Vec<UserId> = (0..20)
        .map(|i| user(&engines[0], &format!("t{i}")))
        .collect();
    let targets = Arc::new(targets);
    let checker = engines.pop().unwrap();

    let outcomes: Vec<LikeOutcome> = spawn_all(engines, move |i, engine| {
        targets
            .iter()
            .skip(i * 5)
            .take(5)
            .map(|&t| engine.ripen(actor, t).unwrap().outcome)
            .collect::<Vec<_>>()
    })
    .into_iter()
    .flatten()
    .collect();

    let recorded = outcomes
        .iter()
        .filter(|o| **o == LikeOutcome::Recorded)
        .count();
    assert_eq!(recorded, 5);
    assert_eq!(outcomes.len() - recorded, 15);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, LikeOutcome::Recorded | LikeOutcome::QuotaExhausted)));

    let db = checker.database();
    assert_eq!(db.get_profile(actor).unwrap().quota.count, 5);
    assert_eq!(db.liked_targets(actor).unwrap().len(), 5);
}

#[test]
fn same_like_from_two_devices_is_recorded_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("peach.db");
    let config = EngineConfig::default();
    let clock = start_clock();
    let notifier = Notifier::new(256);

    let mut engines = engines_on_file(&path, &config, &clock, &notifier, 5);
    let a = user(&engines[0], "a");
    let b = user(&engines[0], "b");
    let checker = engines.pop().unwrap();

    let outcomes = spawn_all(engines, move |_, engine| engine.ripen(a, b).unwrap().outcome);
    let recorded = outcomes
        .iter()
        .filter(|o| **o == LikeOutcome::Recorded)
        .count();
    assert_eq!(recorded, 1);
    assert_eq!(checker.database().get_profile(a).unwrap().quota.count, 1);
}

#[test]
fn simultaneous_mutual_likes_create_one_match_per_pair() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("peach.db");
    let config = EngineConfig::default();
    let clock = start_clock();
    let notifier = Notifier::new(256);
    let mut rx = notifier.subscribe();

    let mut engines = engines_on_file(&path, &config, &clock, &notifier, 3);
    let pairs: Vec<(UserId, UserId)> = (0..10)
        .map(|i| {
            (
                user(&engines[0], &format!("a{i}")),
                user(&engines[0], &format!("b{i}")),
            )
        })
        .collect();
    let pairs = Arc::new(pairs);
    let checker = engines.pop().unwrap();

    let worker_pairs = pairs.clone();
    let results: Vec<Vec<RipenResult>> = spawn_all(engines, move |i, engine| {
        worker_pairs
            .iter()
            .map(|&(a, b)| {
                let (actor, target) = if i == 0 { (a, b) } else { (b, a) };
                engine.ripen(actor, target).unwrap()
            })
            .collect()
    });

    for (n, &(a, b)) in pairs.iter().enumerate() {
        let completed = [&results[0][n], &results[1][n]]
            .iter()
            .filter(|r| r.matched.is_some())
            .count();
        assert_eq!(completed, 1, "pair {n} completed {completed} times");

        assert_eq!(checker.matches(a).unwrap().len(), 1);
        assert_eq!(checker.matches(b).unwrap().len(), 1);
        assert_eq!(checker.conversations(a).unwrap().len(), 1);
        assert_eq!(checker.notifications(b).unwrap().len(), 1);
    }

    let created = std::iter::from_fn(|| rx.try_recv().ok())
        .filter(|e| matches!(e, PeachEvent::MatchCreated { .. }))
        .count();
    assert_eq!(created, pairs.len());
}

#[test]
fn racing_detection_agrees_on_the_same_match() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("peach.db");
    let config = EngineConfig::default();
    let clock = start_clock();
    let notifier = Notifier::new(256);

    let mut engines = engines_on_file(&path, &config, &clock, &notifier, 5);
    let (a, b) = (user(&engines[0], "a"), user(&engines[0], "b"));
    engines[0].record_like(a, b).unwrap();
    engines[0].record_like(b, a).unwrap();
    let checker = engines.pop().unwrap();
    let mut rx = notifier.subscribe();

    let found = spawn_all(engines, move |i, engine| {
        let (x, y) = if i % 2 == 0 { (a, b) } else { (b, a) };
        engine.detect_mutual(x, y).unwrap()
    });

    let first = found[0].clone().unwrap();
    assert!(found.iter().all(|m| m.as_ref() == Some(&first)));
    assert_eq!(checker.matches(a).unwrap(), vec![first]);
    assert_eq!(checker.notifications(a).unwrap().len(), 1);

    let created = std::iter::from_fn(|| rx.try_recv().ok())
        .filter(|e| matches!(e, PeachEvent::MatchCreated { .. }))
        .count();
    assert_eq!(created, 1);
}
