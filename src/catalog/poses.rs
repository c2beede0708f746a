use super::{Correction, PoseDefinition, Severity};

use Severity::{Correct, Error};

fn pose(
    id: &str,
    display_name: &str,
    alternate_name: &str,
    briefing: &str,
    corrections: &[(&str, &str, Severity)],
) -> PoseDefinition {
    PoseDefinition {
        id: id.to_string(),
        display_name: display_name.to_string(),
        alternate_name: alternate_name.to_string(),
        briefing: briefing.to_string(),
        corrections: corrections
            .iter()
            .map(|(area, message, severity)| Correction::new(area, message, *severity))
            .collect(),
    }
}

pub(super) fn builtin_poses() -> Vec<PoseDefinition> {
    vec![
        pose(
            "mountain",
            "Mountain Pose",
            "Tadasana",
            "Stand with feet together, arms at sides. Ground through all four corners of each foot.",
            &[
                ("Spine", "Lengthen through the crown and lift your sternum gently upward", Error),
                ("Shoulders", "Roll shoulders back and draw them down away from the ears", Error),
                ("Feet", "Spread all ten toes wide and press them firmly down", Correct),
                ("Core", "Engage the lower abdomen lightly without holding your breath", Error),
                ("Arms", "Arms are relaxed by your sides, fingers pointing down", Correct),
                ("Chin", "Tuck the chin slightly to lengthen the back of the neck", Error),
            ],
        ),
        pose(
            "warrior1",
            "Warrior I",
            "Virabhadrasana I",
            "Strong lunge with hips squared forward and arms lifted overhead.",
            &[
                ("Hips", "Square both hips toward the front of your mat", Error),
                ("Front Knee", "Bend the front knee to 90° directly over the ankle", Error),
                ("Arms", "Reach actively through the fingertips with shoulders drawing down", Correct),
                ("Back Foot", "Press the outer edge of the back foot firmly into the mat", Error),
                ("Torso", "Lift the torso upright and resist leaning forward", Correct),
                ("Gaze", "Look forward or gently upward between your hands", Correct),
            ],
        ),
        pose(
            "warrior2",
            "Warrior II",
            "Virabhadrasana II",
            "Open hip stance with arms extended parallel to the floor.",
            &[
                ("Front Knee", "Track the knee directly over the second toe", Error),
                ("Arms", "Keep both arms actively parallel and energised", Correct),
                ("Hips", "Open the hips wide; do not let them tip forward", Error),
                ("Torso", "Stack the torso over the pelvis, not leaning to either side", Correct),
                ("Gaze", "Gaze steadily over the front middle finger", Correct),
                ("Shoulders", "Relax the shoulders; they tend to creep up here", Error),
            ],
        ),
        pose(
            "tree",
            "Tree Pose",
            "Vrksasana",
            "Balance on one foot. Place the other foot on the inner thigh.",
            &[
                ("Standing Hip", "Keep the standing hip neutral; do not hike it up", Error),
                ("Raised Foot", "Press foot firmly into thigh and thigh back into foot", Error),
                ("Arms", "Reach through the fingertips, lift through the chest", Correct),
                ("Gaze", "Fix your gaze on one still point ahead to steady the balance", Error),
                ("Core", "Engage the core gently; it is your anchor here", Correct),
                ("Spine", "Grow tall through the crown and avoid collapsing sideways", Error),
            ],
        ),
        pose(
            "triangle",
            "Triangle Pose",
            "Trikonasana",
            "Wide-leg stance with a lateral stretch and spinal rotation.",
            &[
                ("Spine", "Lengthen first, then tilt; do not crunch into the side body", Error),
                ("Top Arm", "Stack the top arm directly above the bottom arm", Error),
                ("Hips", "Open both hips toward the long edge of the mat", Correct),
                ("Front Leg", "Keep the front leg straight but do not lock the knee", Error),
                ("Gaze", "Look up toward the upper hand, but keep the neck relaxed", Correct),
                ("Chest", "Open the chest and rotate the top shoulder back and upward", Error),
            ],
        ),
        pose(
            "eagle",
            "Eagle Pose",
            "Garudasana",
            "Wrap one arm under the other and one leg over the other. Sink and balance.",
            &[
                ("Arms", "Wrap arms completely and lift the elbows to shoulder height", Error),
                ("Legs", "Squeeze the thighs together and lower the hips deeper", Error),
                ("Standing Heel", "Ground through the standing heel actively", Correct),
                ("Gaze", "Fix gaze on a single point ahead to stabilise", Error),
                ("Spine", "Keep the spine tall and resist rounding forward", Correct),
            ],
        ),
        pose(
            "dancer",
            "Dancer's Pose",
            "Natarajasana",
            "Stand on one leg. Reach back for the lifted foot. Extend the opposite arm forward.",
            &[
                ("Standing Leg", "Root the standing leg firmly; knee soft, not locked", Correct),
                ("Lifted Leg", "Kick the foot actively into the hand rather than just pulling", Error),
                ("Reach Arm", "Extend the front arm forward and upward energetically", Error),
                ("Hips", "Keep both hips squared forward; do not open to the side", Error),
                ("Gaze", "Soft, steady gaze forward to maintain balance", Correct),
            ],
        ),
        pose(
            "crow",
            "Crow Pose",
            "Bakasana",
            "Arm balance. Knees on the upper arms, lean your weight forward.",
            &[
                ("Wrists", "Spread the fingers wide and distribute weight evenly across the palms", Error),
                ("Core", "Draw the belly in and upward strongly to lift the hips", Error),
                ("Gaze", "Look about 15 cm forward on the mat, not straight down", Error),
                ("Elbows", "Hold the elbows shoulder-width apart; do not let them flare outward", Correct),
                ("Knees", "Press both knees firmly into the upper arms to anchor the pose", Correct),
            ],
        ),
        pose(
            "child",
            "Child's Pose",
            "Balasana",
            "A resting fold. Hips toward heels, arms extended, forehead down.",
            &[
                ("Hips", "Sink hips back toward the heels completely", Error),
                ("Forehead", "Rest the forehead gently on the mat and release the neck", Correct),
                ("Arms", "Extend arms fully forward and relax the shoulders", Error),
                ("Breath", "Breathe into the back body and let the ribs expand sideways", Correct),
                ("Neck", "Release all tension from the neck and jaw completely", Correct),
            ],
        ),
        pose(
            "lotus",
            "Lotus Pose",
            "Padmasana",
            "Seated cross-leg with each foot resting on the opposite thigh.",
            &[
                ("Spine", "Sit tall; do not let the lower back collapse or round", Error),
                ("Knees", "Both knees should rest naturally toward the floor", Error),
                ("Hands", "Rest hands on knees, palms facing up or in Chin Mudra", Correct),
                ("Shoulders", "Release the shoulders and let them fall away from the ears", Correct),
                ("Chin", "Tuck the chin very slightly to lengthen the back of the neck", Error),
            ],
        ),
        pose(
            "seated",
            "Seated Forward Fold",
            "Paschimottanasana",
            "Sit tall, hinge forward from the hips, and reach toward the feet.",
            &[
                ("Spine", "Hinge from the hips; do not round the upper back to reach further", Error),
                ("Legs", "Press the backs of both legs firmly and evenly into the mat", Error),
                ("Reach", "Reach through the hands actively rather than just grabbing", Correct),
                ("Shoulders", "Draw the shoulders down and away from the ears", Correct),
                ("Feet", "Flex the feet so toes point upward toward the ceiling", Error),
            ],
        ),
    ]
}
