use proptest::prelude::*;
use skirmish_system_dice::{Dice, Roll};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rolls_stay_within_die_faces(seed in any::<u64>(), sides in 1u32..=1_000) {
        let mut dice = Dice::seeded(seed);
        for _ in 0..64 {
            let value = dice.roll(sides);
            prop_assert!((1..=sides).contains(&value), "rolled {value} on d{sides}");
        }
    }

    #[test]
    fn six_sided_faces_are_evenly_distributed(seed in any::<u64>()) {
        const SAMPLES: usize = 60_000;
        let mut dice = Dice::seeded(seed);
        let mut counts = [0usize; 6];
        for _ in 0..SAMPLES {
            let face = dice.roll(6);
            counts[(face - 1) as usize] += 1;
        }

        // Expected 10_000 per face with a standard deviation near 91.
        for (face, count) in counts.iter().enumerate() {
            prop_assert!(
                (9_400..=10_600).contains(count),
                "face {} appeared {count} times",
                face + 1,
            );
        }
    }
}

#[test]
fn percentile_die_covers_both_extremes() {
    let mut dice = Dice::seeded(11);
    let rolls: Vec<u32> = (0..20_000).map(|_| dice.roll(100)).collect();

    assert!(rolls.contains(&1));
    assert!(rolls.contains(&100));
    assert!(rolls.iter().all(|roll| (1..=100).contains(roll)));
}
