//! Roll-cycle scenarios driven over the animation channel with a paused
//! clock, so the per-die timers settle instantly and deterministically.
//! Cross-die completion order is deliberately never asserted.

use dicetray::app::{AnimEvent, AppConfig, AppController};
use tokio::sync::mpsc;

fn seeded_controller(seed: u64) -> AppController {
    AppController::new(&AppConfig {
        seed: Some(seed),
        log_file: None,
    })
}

/// Applies events until the cycle's bound timeout fires.
async fn settle(
    controller: &mut AppController,
    rx: &mut mpsc::UnboundedReceiver<AnimEvent>,
) {
    loop {
        let event = rx.recv().await.expect("animation channel closed early");
        let done = event == AnimEvent::CycleDone;
        controller.apply(event);
        if done {
            break;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn roll_cycle__settles_every_unheld_die() {
    let mut controller = seeded_controller(7);
    let (tx, mut rx) = mpsc::unbounded_channel();

    assert!(controller.start_roll(&tx));
    assert!(!controller.trigger_enabled());

    settle(&mut controller, &mut rx).await;

    let snap = controller.build_snapshot();
    assert!(snap.trigger_enabled);
    for die in &snap.dice {
        assert!(matches!(die.value, Some(1..=6)));
        assert!(!die.rolling);
        assert_eq!(die.flicker, None);
    }
    let total: u16 = snap.dice.iter().map(|d| u16::from(d.value.unwrap())).sum();
    assert_eq!(snap.sum, Some(total));
}

#[tokio::test(start_paused = true)]
async fn roll_cycle__held_dice_keep_their_values() {
    let mut controller = seeded_controller(11);
    controller.toggle_hold(1);
    controller.toggle_hold(3);
    let before = controller.build_snapshot();

    let (tx, mut rx) = mpsc::unbounded_channel();
    assert!(controller.start_roll(&tx));
    settle(&mut controller, &mut rx).await;

    let after = controller.build_snapshot();
    assert_eq!(after.dice[1].value, before.dice[1].value);
    assert_eq!(after.dice[3].value, before.dice[3].value);
    for i in [0, 2, 4] {
        assert!(matches!(after.dice[i].value, Some(1..=6)));
    }
    assert_eq!(
        after.sum,
        Some(after.dice.iter().map(|d| u16::from(d.value.unwrap())).sum())
    );
}

#[tokio::test(start_paused = true)]
async fn roll_cycle__second_roll_is_ignored_until_the_timeout() {
    let mut controller = seeded_controller(13);
    let (tx, mut rx) = mpsc::unbounded_channel();

    assert!(controller.start_roll(&tx));
    // Trigger is disabled for the whole cycle, whatever the dice are doing.
    assert!(!controller.start_roll(&tx));

    settle(&mut controller, &mut rx).await;

    assert!(controller.trigger_enabled());
    assert!(controller.start_roll(&tx));
    settle(&mut controller, &mut rx).await;
}

#[tokio::test(start_paused = true)]
async fn roll_cycle__with_everything_held_changes_nothing() {
    let mut controller = seeded_controller(17);
    for i in 0..5 {
        controller.toggle_hold(i);
    }
    let before = controller.build_snapshot();

    let (tx, mut rx) = mpsc::unbounded_channel();
    // The cycle still runs (and re-enables the trigger at its timeout),
    // it just has no participants.
    assert!(controller.start_roll(&tx));
    settle(&mut controller, &mut rx).await;

    let after = controller.build_snapshot();
    assert!(after.trigger_enabled);
    for (b, a) in before.dice.iter().zip(after.dice.iter()) {
        assert_eq!(b.value, a.value);
    }
}

#[tokio::test(start_paused = true)]
async fn roll_cycle__flicker_faces_are_cosmetic_only() {
    let mut controller = seeded_controller(19);
    let values_before: Vec<_> =
        controller.build_snapshot().dice.iter().map(|d| d.value).collect();

    let (tx, mut rx) = mpsc::unbounded_channel();
    assert!(controller.start_roll(&tx));

    // A flicker on a rolling die shows up in the snapshot but leaves the
    // committed value alone.
    controller.apply(AnimEvent::Flicker { die: 0, face: 3 });
    let snap = controller.build_snapshot();
    assert!(snap.dice[0].rolling);
    assert_eq!(snap.dice[0].flicker, Some(3));
    assert_eq!(snap.dice[0].value, values_before[0]);

    settle(&mut controller, &mut rx).await;
    assert_eq!(controller.build_snapshot().dice[0].flicker, None);
}
