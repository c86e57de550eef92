use dicetray::tray::{
    self, COMMIT_DELAY_MAX, COMMIT_DELAY_MIN, DICE_COUNT, FACE_MAX, FACE_MIN, Tray,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn toggle_hold__twice_restores_the_original_state(
        seed in any::<u64>(),
        die in 0..DICE_COUNT,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tray = Tray::new(&mut rng);
        let value_before = tray.die(die).value;

        tray.toggle_hold(die);
        prop_assert!(tray.die(die).held);
        prop_assert_eq!(tray.die(die).value, value_before);

        tray.toggle_hold(die);
        prop_assert!(!tray.die(die).held);
        prop_assert_eq!(tray.die(die).value, value_before);
    }

    #[test]
    fn sum__is_the_arithmetic_total_of_all_faces(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let tray = Tray::new(&mut rng);

        let expected: u16 = tray
            .dice()
            .iter()
            .map(|d| u16::from(d.value.unwrap()))
            .sum();
        prop_assert_eq!(tray.sum(), Some(expected));
    }

    #[test]
    fn plan_roll__excludes_held_dice_and_bounds_delays(
        seed in any::<u64>(),
        held in proptest::collection::vec(any::<bool>(), DICE_COUNT),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tray = Tray::new(&mut rng);
        for (i, hold) in held.iter().enumerate() {
            if *hold {
                tray.toggle_hold(i);
            }
        }

        let plan = tray::plan_roll(&tray, &mut rng);
        prop_assert_eq!(plan.dice.len(), held.iter().filter(|h| !**h).count());
        for planned in &plan.dice {
            prop_assert!(!held[planned.die]);
            prop_assert!(planned.delay >= COMMIT_DELAY_MIN);
            prop_assert!(planned.delay < COMMIT_DELAY_MAX);
            prop_assert!((FACE_MIN..=FACE_MAX).contains(&planned.value));
        }
    }

    #[test]
    fn hold__never_changes_a_committed_value_across_a_cycle(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tray = Tray::new(&mut rng);
        tray.toggle_hold(1);
        tray.toggle_hold(3);
        let held_values = [tray.die(1).value, tray.die(3).value];

        let plan = tray::plan_roll(&tray, &mut rng);
        tray.begin_roll(&plan);
        for planned in &plan.dice {
            tray.commit(planned.die, planned.value);
        }

        prop_assert_eq!(tray.die(1).value, held_values[0]);
        prop_assert_eq!(tray.die(3).value, held_values[1]);
        prop_assert!(!tray.any_rolling());
    }
}
