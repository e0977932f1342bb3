mod common;

use chrono::Duration;
use peach_engine::{EngineConfig, EngineError, PeachEvent};
use peach_shared::{Allowance, ChannelId, Clock};
use peach_store::LikeOutcome;

use common::{harness, harness_with, user};

#[test]
fn second_like_of_same_target_is_already_liked() {
    let h = harness();
    let (a, b) = (user(&h.engine, "a"), user(&h.engine, "b"));

    assert_eq!(h.engine.ripen(a, b).unwrap().outcome, LikeOutcome::Recorded);
    assert_eq!(
        h.engine.ripen(a, b).unwrap().outcome,
        LikeOutcome::AlreadyLiked
    );

    let db = h.engine.database();
    assert_eq!(db.liked_targets(a).unwrap(), vec![b]);
    assert_eq!(db.get_profile(a).unwrap().quota.count, 1);
}

#[test]
fn like_after_limit_is_quota_exhausted() {
    let h = harness();
    let a = user(&h.engine, "a");
    let limit = h.engine.policy().daily_limit;
    assert_eq!(limit, 25);

    for i in 0..limit {
        let t = user(&h.engine, &format!("t{i}"));
        assert_eq!(h.engine.ripen(a, t).unwrap().outcome, LikeOutcome::Recorded);
    }
    assert_eq!(h.engine.quota(a).unwrap(), Allowance::Exhausted);

    let extra = user(&h.engine, "extra");
    assert_eq!(
        h.engine.ripen(a, extra).unwrap().outcome,
        LikeOutcome::QuotaExhausted
    );
    let db = h.engine.database();
    assert!(!db.like_exists(a, extra).unwrap());
    assert_eq!(db.get_profile(a).unwrap().quota.count, limit);
}

#[test]
fn stale_count_resets_on_a_new_day() {
    let h = harness_with(EngineConfig {
        daily_like_limit: 2,
        ..EngineConfig::default()
    });
    let a = user(&h.engine, "a");
    for alias in ["t1", "t2"] {
        let t = user(&h.engine, alias);
        h.engine.ripen(a, t).unwrap();
    }
    assert_eq!(h.engine.quota(a).unwrap(), Allowance::Exhausted);

    h.clock.advance_days(1);
    // checking does not write
    assert_eq!(h.engine.quota(a).unwrap(), Allowance::Remaining(2));
    assert_eq!(h.engine.database().get_profile(a).unwrap().quota.count, 2);

    let t3 = user(&h.engine, "t3");
    assert_eq!(h.engine.ripen(a, t3).unwrap().outcome, LikeOutcome::Recorded);
    let quota = h.engine.database().get_profile(a).unwrap().quota;
    assert_eq!(quota.count, 1);
    assert_eq!(quota.reset_date, Some(h.clock.today()));
}

#[test]
fn premium_users_are_not_limited() {
    let h = harness_with(EngineConfig {
        daily_like_limit: 1,
        ..EngineConfig::default()
    });
    let a = user(&h.engine, "a");
    h.engine.grant_premium(a).unwrap();
    assert_eq!(h.engine.quota(a).unwrap(), Allowance::Unlimited);
    assert_eq!(
        h.engine
            .quota(a)
            .unwrap()
            .display_count(h.engine.policy()),
        999
    );

    for alias in ["t1", "t2", "t3"] {
        let t = user(&h.engine, alias);
        assert_eq!(h.engine.ripen(a, t).unwrap().outcome, LikeOutcome::Recorded);
    }

    // premium lapses after the configured 30 days
    h.clock.advance_days(31);
    assert_eq!(h.engine.quota(a).unwrap(), Allowance::Remaining(1));
}

#[test]
fn mutual_likes_match_exactly_once_in_either_order() {
    for reverse in [false, true] {
        let h = harness();
        let (a, b) = (user(&h.engine, "a"), user(&h.engine, "b"));
        let (first, second) = if reverse { (b, a) } else { (a, b) };

        let r1 = h.engine.ripen(first, second).unwrap();
        assert!(r1.matched.is_none());

        let r2 = h.engine.ripen(second, first).unwrap();
        let m = r2.matched.expect("second like completes the match");
        assert!(m.users.contains(a) && m.users.contains(b));
        assert_eq!(m.channel_id, ChannelId::for_pair(a, b).unwrap());

        assert_eq!(h.engine.matches(a).unwrap(), vec![m.clone()]);
        assert_eq!(h.engine.matches(b).unwrap(), vec![m]);
    }
}

#[test]
fn split_record_and_detect_agree_with_ripen() {
    let h = harness();
    let (a, b) = (user(&h.engine, "a"), user(&h.engine, "b"));

    assert_eq!(h.engine.record_like(a, b).unwrap(), LikeOutcome::Recorded);
    assert!(h.engine.detect_mutual(a, b).unwrap().is_none());

    assert_eq!(h.engine.record_like(b, a).unwrap(), LikeOutcome::Recorded);
    let m = h.engine.detect_mutual(b, a).unwrap().unwrap();
    // the loser of a detection race sees the same match
    assert_eq!(h.engine.detect_mutual(a, b).unwrap(), Some(m));
    assert_eq!(h.engine.matches(a).unwrap().len(), 1);
}

#[test]
fn self_like_is_always_invalid() {
    let h = harness();
    let a = user(&h.engine, "a");
    assert!(matches!(
        h.engine.ripen(a, a),
        Err(EngineError::InvalidArgument(_))
    ));

    // even with quota exhausted
    let h = harness_with(EngineConfig {
        daily_like_limit: 0,
        ..EngineConfig::default()
    });
    let a = user(&h.engine, "a");
    assert!(matches!(
        h.engine.record_like(a, a),
        Err(EngineError::InvalidArgument(_))
    ));
}

#[test]
fn unknown_and_banned_users_are_rejected() {
    let h = harness();
    let (a, b) = (user(&h.engine, "a"), user(&h.engine, "b"));
    let ghost = peach_shared::UserId::new();

    assert!(matches!(
        h.engine.ripen(a, ghost),
        Err(EngineError::UnknownUser(id)) if id == ghost
    ));

    h.engine.ban_user(a).unwrap();
    let err = h.engine.ripen(a, b).unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
    assert!(!err.is_retryable());

    h.engine.unban_user(a).unwrap();
    assert_eq!(h.engine.ripen(a, b).unwrap().outcome, LikeOutcome::Recorded);
}

#[test]
fn events_follow_committed_changes() {
    let h = harness();
    let mut rx = h.engine.subscribe();
    let (a, b) = (user(&h.engine, "a"), user(&h.engine, "b"));

    h.engine.ripen(a, b).unwrap();
    h.engine.ripen(a, b).unwrap(); // already liked: no event
    h.engine.ripen(b, a).unwrap();

    assert_eq!(
        rx.try_recv().unwrap(),
        PeachEvent::LikeRecorded { actor: a, target: b }
    );
    assert_eq!(
        rx.try_recv().unwrap(),
        PeachEvent::LikeRecorded { actor: b, target: a }
    );
    match rx.try_recv().unwrap() {
        PeachEvent::MatchCreated { users, channel_id } => {
            assert!(users.contains(a));
            assert_eq!(channel_id, ChannelId::for_pair(a, b).unwrap());
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(rx.try_recv().is_err());
}

#[test]
fn match_notifies_both_users() {
    let h = harness();
    let (a, b) = (user(&h.engine, "a"), user(&h.engine, "b"));
    h.engine.ripen(a, b).unwrap();
    assert!(h.engine.notifications(a).unwrap().is_empty());

    h.clock.advance(Duration::minutes(5));
    h.engine.ripen(b, a).unwrap();

    let for_a = h.engine.notifications(a).unwrap();
    assert_eq!(for_a.len(), 1);
    assert!(h.engine.mark_notification_read(for_a[0].id).unwrap());
    assert!(h.engine.notifications(a).unwrap()[0].read);
    assert_eq!(h.engine.notifications(b).unwrap().len(), 1);
}

#[test]
fn failure_inside_ripen_leaves_no_partial_state() {
    let h = harness();
    let (a, b) = (user(&h.engine, "a"), user(&h.engine, "b"));
    h.engine.ripen(a, b).unwrap();
    let mut rx = h.engine.subscribe();

    // the match notification is the last write of the mutual like
    h.engine
        .database()
        .conn()
        .execute_batch("DROP TABLE notifications")
        .unwrap();

    let err = h.engine.ripen(b, a).unwrap_err();
    assert!(matches!(err, EngineError::Storage(_)));

    let db = h.engine.database();
    assert!(!db.like_exists(b, a).unwrap());
    assert_eq!(db.get_profile(b).unwrap().quota.count, 0);
    assert!(h.engine.matches(a).unwrap().is_empty());
    assert!(h.engine.conversations(a).unwrap().is_empty());
    assert!(rx.try_recv().is_err());
}
