//! Built-in stretch catalog.
//!
//! Seed data for running without any external source. Durations are per
//! side; two-sided entries pick up the 3-second switch window automatically.

use super::{Sides, Stretch};

fn entry(
    id: i64,
    name: &str,
    groups: &[&str],
    seconds_per_side: u64,
    sides: Sides,
    dynamic: bool,
    description: &str,
) -> Stretch {
    Stretch {
        id,
        name: name.into(),
        muscle_groups: groups.iter().map(|g| g.to_string()).collect(),
        seconds_per_side,
        sides,
        dynamic,
        description: description.into(),
    }
}

/// The built-in catalog.
pub fn builtin() -> Vec<Stretch> {
    vec![
        entry(
            1,
            "Neck Roll",
            &["neck"],
            30,
            Sides::One,
            true,
            "Slowly roll your head in a circle, 5 times each direction.",
        ),
        entry(
            2,
            "Shoulder Shrugs",
            &["shoulders", "neck"],
            30,
            Sides::One,
            true,
            "Raise shoulders to ears, hold 3 seconds, release. Repeat 10 times.",
        ),
        entry(
            3,
            "Wrist Circles",
            &["forearms-wrists"],
            20,
            Sides::One,
            true,
            "Rotate wrists in circles, 10 times each direction.",
        ),
        entry(
            4,
            "Seated Spinal Twist",
            &["back", "core", "hips"],
            30,
            Sides::Two,
            false,
            "Sit tall, twist torso to one side, hold, then switch. Hold each side.",
        ),
        entry(
            5,
            "Standing Quad Stretch",
            &["quads", "hips"],
            30,
            Sides::Two,
            false,
            "Stand on one leg, pull other foot to glutes. Hold each leg.",
        ),
        entry(
            6,
            "Chest Opener",
            &["chest", "shoulders"],
            20,
            Sides::One,
            false,
            "Clasp hands behind back, lift arms and open chest. Hold.",
        ),
        entry(
            7,
            "Forward Fold",
            &["hamstrings", "lower-back", "calves"],
            30,
            Sides::One,
            false,
            "Stand with feet hip-width, fold forward and let arms hang. Relax.",
        ),
        entry(
            8,
            "Cat-Cow Stretch",
            &["back", "core", "neck"],
            60,
            Sides::One,
            true,
            "On hands and knees, alternate arching and rounding your back.",
        ),
        entry(
            9,
            "Figure Four Stretch",
            &["hips", "glutes", "lower-back"],
            30,
            Sides::Two,
            false,
            "Lie on back, cross ankle over opposite knee, pull legs toward chest.",
        ),
        entry(
            10,
            "Tricep Stretch",
            &["triceps", "shoulders"],
            20,
            Sides::Two,
            false,
            "Raise arm overhead, bend elbow, use other hand to gently push elbow down.",
        ),
        entry(
            11,
            "Chin Tuck",
            &["neck"],
            20,
            Sides::One,
            false,
            "Pull chin straight back, creating a double chin. Hold and release.",
        ),
        entry(
            12,
            "Side Neck Stretch",
            &["neck", "shoulders"],
            20,
            Sides::Two,
            false,
            "Tilt ear toward shoulder, gently press with hand. Hold each side.",
        ),
        entry(
            13,
            "Shoulder Rolls",
            &["shoulders", "neck", "upper-back"],
            30,
            Sides::One,
            true,
            "Roll shoulders forward 10 times, then backward 10 times.",
        ),
        entry(
            14,
            "Cross-Body Shoulder Stretch",
            &["shoulders", "upper-back"],
            20,
            Sides::Two,
            false,
            "Pull one arm across your chest with the other hand. Hold each side.",
        ),
        entry(
            15,
            "Doorway Chest Stretch",
            &["chest", "shoulders", "biceps"],
            45,
            Sides::One,
            false,
            "Place forearms on door frame, step forward until you feel the stretch.",
        ),
    ]
}

/// Every muscle group in the catalog, distinct and sorted.
pub fn muscle_groups(stretches: &[Stretch]) -> Vec<String> {
    let mut groups: Vec<String> = stretches
        .iter()
        .flat_map(|s| s.muscle_groups.iter().cloned())
        .collect();
    groups.sort();
    groups.dedup();
    groups
}
