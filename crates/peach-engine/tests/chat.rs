mod common;

use chrono::Duration;
use peach_engine::{EngineError, PeachEvent};
use peach_shared::{ChannelId, UserId};

use common::{harness, user, Harness};

fn matched_pair(h: &Harness) -> (UserId, UserId, ChannelId) {
    let (a, b) = (user(&h.engine, "ada"), user(&h.engine, "bola"));
    h.engine.ripen(a, b).unwrap();
    let m = h.engine.ripen(b, a).unwrap().matched.unwrap();
    (a, b, m.channel_id)
}

#[test]
fn channel_id_is_symmetric_and_stable() {
    let h = harness();
    let (a, b) = (user(&h.engine, "a"), user(&h.engine, "b"));

    let ab = h.engine.get_or_create_channel(a, b).unwrap();
    let ba = h.engine.get_or_create_channel(b, a).unwrap();
    assert_eq!(ab, ba);
    assert_eq!(ab, ChannelId::for_pair(a, b).unwrap());
    assert_eq!(h.engine.conversations(a).unwrap().len(), 1);

    assert!(matches!(
        h.engine.get_or_create_channel(a, a),
        Err(EngineError::InvalidArgument(_))
    ));
}

#[test]
fn match_channel_is_the_pair_channel() {
    let h = harness();
    let (a, b, channel) = matched_pair(&h);
    assert_eq!(h.engine.get_or_create_channel(b, a).unwrap(), channel);
}

#[test]
fn messages_come_back_in_send_order() {
    let h = harness();
    let (a, b, channel) = matched_pair(&h);

    h.engine.send_message(&channel, a, "M1").unwrap();
    h.engine.send_message(&channel, b, "M2").unwrap();
    h.engine.send_message(&channel, a, "M3").unwrap();

    let messages = h.engine.list_messages(&channel).unwrap();
    let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["M1", "M2", "M3"]);
    assert_eq!(messages[1].sender_id, b);
    assert!(messages.windows(2).all(|w| w[0].seq < w[1].seq));

    let tail = h
        .engine
        .messages_after(&channel, messages[0].seq, 10)
        .unwrap();
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].content, "M2");
}

#[test]
fn mark_read_is_idempotent_and_only_touches_incoming() {
    let h = harness();
    let (a, b, channel) = matched_pair(&h);
    let mut rx = h.engine.subscribe();

    h.engine.send_message(&channel, a, "one").unwrap();
    h.engine.send_message(&channel, a, "two").unwrap();
    h.engine.send_message(&channel, b, "reply").unwrap();

    assert_eq!(h.engine.mark_read(&channel, b).unwrap(), 2);
    assert_eq!(h.engine.mark_read(&channel, b).unwrap(), 0);

    let messages = h.engine.list_messages(&channel).unwrap();
    assert!(messages[0].read && messages[1].read);
    assert!(!messages[2].read);

    let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    let reads: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, PeachEvent::MessagesRead { .. }))
        .collect();
    assert_eq!(
        reads,
        [&PeachEvent::MessagesRead {
            channel_id: channel.clone(),
            reader: b,
            count: 2
        }]
    );
    assert_eq!(events.len(), 4);
}

#[test]
fn conversations_show_partner_preview_and_unread() {
    let h = harness();
    let (a, b, first) = matched_pair(&h);
    let c = user(&h.engine, "chidi");
    let second = h.engine.get_or_create_channel(a, c).unwrap();

    h.engine.send_message(&first, b, "hey").unwrap();
    h.clock.advance(Duration::minutes(1));
    h.engine.send_message(&second, c, "hello there").unwrap();

    let list = h.engine.conversations(a).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].partner, c);
    assert_eq!(list[0].channel.last_message.as_deref(), Some("hello there"));
    assert_eq!(list[0].unread, 1);
    assert_eq!(list[1].partner, b);

    h.engine.mark_read(&first, a).unwrap();
    let list = h.engine.conversations(a).unwrap();
    assert_eq!(list[1].unread, 0);
}

#[test]
fn bad_messages_are_rejected() {
    let h = harness();
    let (a, _b, channel) = matched_pair(&h);
    let outsider = user(&h.engine, "zed");

    for blank in ["", "   ", "\n\t"] {
        assert!(matches!(
            h.engine.send_message(&channel, a, blank),
            Err(EngineError::InvalidArgument(_))
        ));
    }
    assert!(matches!(
        h.engine.send_message(&channel, outsider, "hi"),
        Err(EngineError::InvalidArgument(_))
    ));

    let never_opened = ChannelId::for_pair(a, outsider).unwrap();
    assert!(matches!(
        h.engine.send_message(&never_opened, a, "hi"),
        Err(EngineError::UnknownChannel(id)) if id == never_opened
    ));
    assert!(matches!(
        h.engine.list_messages(&never_opened),
        Err(EngineError::UnknownChannel(_))
    ));

    assert!(h.engine.list_messages(&channel).unwrap().is_empty());
}

#[test]
fn malformed_channel_ids_do_not_parse() {
    assert!("no-separator".parse::<ChannelId>().is_err());
    let (a, b) = (UserId::new(), UserId::new());
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    assert!(format!("{high}_{low}").parse::<ChannelId>().is_err());
    assert!(format!("{low}_{high}").parse::<ChannelId>().is_ok());
}
