#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use peach_engine::{EngineConfig, MatchEngine, Notifier};
use peach_shared::{Basics, Clock, Life, ManualClock, Profile, Relationships, UserId};
use peach_store::Database;

pub struct Harness {
    pub engine: MatchEngine,
    pub clock: Arc<ManualClock>,
}

pub fn start_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    ))
}

pub fn harness() -> Harness {
    harness_with(EngineConfig::default())
}

pub fn harness_with(config: EngineConfig) -> Harness {
    peach_engine::telemetry::init_tracing("peach_engine=debug,peach_store=debug");
    let clock = start_clock();
    let engine = MatchEngine::new(
        Database::open_in_memory().unwrap(),
        &config,
        clock.clone() as Arc<dyn Clock>,
        Notifier::new(64),
    );
    Harness { engine, clock }
}

/// One engine per connection, all on the same database file.
pub fn engines_on_file(
    path: &Path,
    config: &EngineConfig,
    clock: &Arc<ManualClock>,
    notifier: &Notifier,
    count: usize,
) -> Vec<MatchEngine> {
    (0..count)
        .map(|_| {
            MatchEngine::new(
                Database::open_at(path, config.busy_timeout).unwrap(),
                config,
                clock.clone() as Arc<dyn Clock>,
                notifier.clone(),
            )
        })
        .collect()
}

pub fn tags(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// An onboarded profile with no attribute groups.
pub fn user(engine: &MatchEngine, alias: &str) -> UserId {
    let mut p = Profile::new(UserId::new(), alias, engine_now());
    p.onboarding_complete = true;
    engine.save_profile(&p).unwrap();
    p.id
}

/// An onboarded profile with every attribute group filled in.
pub fn rich_user(
    engine: &MatchEngine,
    alias: &str,
    fun: &[&str],
    based: &str,
    looking_for: &str,
) -> UserId {
    let mut p = Profile::new(UserId::new(), alias, engine_now());
    p.onboarding_complete = true;
    p.basics = Some(Basics {
        fun: tags(fun),
        media: tags(&["Afrobeats"]),
    });
    p.life = Some(Life {
        based: Some(based.into()),
        upbringing: None,
    });
    p.relationships = Some(Relationships {
        values: tags(&["Honesty"]),
        looking_for: Some(looking_for.into()),
    });
    engine.save_profile(&p).unwrap();
    p.id
}

fn engine_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}
