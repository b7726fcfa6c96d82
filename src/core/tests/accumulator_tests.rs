use std::time::{Duration, Instant};

use crate::core::accumulator::{AccumulatorState, KeyEvent, KeyOutcome, KeystrokeAccumulator};

const DELAY: Duration = Duration::from_millis(40);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn type_str(acc: &mut KeystrokeAccumulator, text: &str, at: Instant) {
    for c in text.chars() {
        acc.on_key(&KeyEvent::Char(c), true, at);
    }
}

#[test]
fn test_starts_idle() {
    let acc = KeystrokeAccumulator::new(DELAY);

    assert_eq!(acc.state(), AccumulatorState::Idle);
    assert_eq!(acc.buffer(), "");
    assert!(acc.deadline().is_none());
}

#[test]
fn test_char_schedules_flush_after_delay() {
    let mut acc = KeystrokeAccumulator::new(DELAY);
    let t0 = Instant::now();

    let outcome = acc.on_key(&KeyEvent::Char('s'), true, t0);

    match outcome {
        KeyOutcome::Scheduled(pending) => assert_eq!(pending.deadline, t0 + DELAY),
        other => panic!("expected a scheduled flush, got {:?}", other),
    }
    assert_eq!(acc.state(), AccumulatorState::Accumulating);
    assert_eq!(acc.buffer(), "s");
}

#[test]
fn test_keys_within_delay_extend_single_flush() {
    let mut acc = KeystrokeAccumulator::new(DELAY);
    let t0 = Instant::now();

    acc.on_key(&KeyEvent::Char('s'), true, t0);
    acc.on_key(&KeyEvent::Char('a'), true, t0 + ms(30));
    acc.on_key(&KeyEvent::Char('v'), true, t0 + ms(60));

    // The first deadline has passed, but it was superseded
    assert_eq!(acc.poll(t0 + ms(45)), None);
    assert_eq!(acc.deadline(), Some(t0 + ms(100)));

    assert_eq!(acc.poll(t0 + ms(100)), Some("sav".to_string()));
    assert_eq!(acc.state(), AccumulatorState::Idle);
    assert_eq!(acc.buffer(), "", "buffer is cleared at flush time");
    assert_eq!(acc.poll(t0 + ms(500)), None, "exactly one flush");
}

#[test]
fn test_named_key_discards_buffer() {
    let mut acc = KeystrokeAccumulator::new(DELAY);
    let t0 = Instant::now();
    type_str(&mut acc, "sa", t0);

    let outcome = acc.on_key(&KeyEvent::Named("Shift".to_string()), true, t0 + ms(10));

    assert_eq!(outcome, KeyOutcome::Discarded);
    assert_eq!(acc.state(), AccumulatorState::Idle);
    assert_eq!(acc.poll(t0 + ms(1000)), None);
}

#[test]
fn test_focus_loss_discards_buffer() {
    let mut acc = KeystrokeAccumulator::new(DELAY);
    let t0 = Instant::now();
    type_str(&mut acc, "sa", t0);

    acc.on_focus_lost();

    assert_eq!(acc.state(), AccumulatorState::Idle);
    assert_eq!(acc.poll(t0 + ms(1000)), None);
}

#[test]
fn test_unfocused_events_ignored() {
    let mut acc = KeystrokeAccumulator::new(DELAY);
    let t0 = Instant::now();
    acc.on_key(&KeyEvent::Char('s'), true, t0);

    let ignored_char = acc.on_key(&KeyEvent::Char('x'), false, t0 + ms(20));
    let ignored_named = acc.on_key(&KeyEvent::Named("Enter".to_string()), false, t0 + ms(25));

    assert_eq!(ignored_char, KeyOutcome::Ignored);
    assert_eq!(ignored_named, KeyOutcome::Ignored);
    // Neither the buffer nor the deadline moved
    assert_eq!(acc.buffer(), "s");
    assert_eq!(acc.deadline(), Some(t0 + DELAY));
    assert_eq!(acc.poll(t0 + DELAY), Some("s".to_string()));
}

#[test]
fn test_stale_handle_does_not_fire() {
    let mut acc = KeystrokeAccumulator::new(DELAY);
    let t0 = Instant::now();

    let first = match acc.on_key(&KeyEvent::Char('a'), true, t0) {
        KeyOutcome::Scheduled(pending) => pending.handle,
        other => panic!("expected a scheduled flush, got {:?}", other),
    };
    let second = match acc.on_key(&KeyEvent::Char('b'), true, t0 + ms(5)) {
        KeyOutcome::Scheduled(pending) => pending.handle,
        other => panic!("expected a scheduled flush, got {:?}", other),
    };

    assert_ne!(first, second);
    assert_eq!(acc.expire(first), None);
    assert_eq!(acc.expire(second), Some("ab".to_string()));
    assert_eq!(acc.expire(second), None);
}

#[test]
fn test_typing_after_flush_starts_fresh() {
    let mut acc = KeystrokeAccumulator::new(DELAY);
    let t0 = Instant::now();
    type_str(&mut acc, "ab", t0);
    assert_eq!(acc.poll(t0 + DELAY), Some("ab".to_string()));

    type_str(&mut acc, "c", t0 + ms(50));

    assert_eq!(acc.buffer(), "c");
    assert_eq!(acc.poll(t0 + ms(90)), Some("c".to_string()));
}

#[test]
fn test_set_delay_applies_to_next_key() {
    let mut acc = KeystrokeAccumulator::new(DELAY);
    let t0 = Instant::now();
    acc.on_key(&KeyEvent::Char('a'), true, t0);

    acc.set_delay(ms(100));
    assert_eq!(acc.deadline(), Some(t0 + DELAY));

    acc.on_key(&KeyEvent::Char('b'), true, t0 + ms(10));
    assert_eq!(acc.deadline(), Some(t0 + ms(110)));
    assert_eq!(acc.delay(), ms(100));
}

#[test]
fn test_zero_delay_flushes_on_next_poll() {
    let mut acc = KeystrokeAccumulator::new(Duration::ZERO);
    let t0 = Instant::now();
    acc.on_key(&KeyEvent::Char('q'), true, t0);

    assert_eq!(acc.poll(t0), Some("q".to_string()));
}

#[test]
fn test_key_event_from_key() {
    assert_eq!(KeyEvent::from_key("a"), KeyEvent::Char('a'));
    assert_eq!(KeyEvent::from_key("é"), KeyEvent::Char('é'));
    assert_eq!(KeyEvent::from_key("Shift"), KeyEvent::Named("Shift".to_string()));
    assert_eq!(KeyEvent::from_key(""), KeyEvent::Named(String::new()));
}
