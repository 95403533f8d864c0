//! Fixed catalog of photography goals drawn onto every bingo board.

use super::board::{BOARD_CELLS, FREE_CELLS};

/// Immutable description of one photography goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Goal {
    /// Short title shown on the board.
    pub name: &'static str,
    /// Longer explanation of what the photo should show.
    pub description: &'static str,
}

/// Synthetic goal rendered on the center space. Never drawn from [`GOALS`].
pub const FREE_SPACE: Goal = Goal {
    name: "Free Space",
    description: "Automatically completed.",
};

/// Number of drawable goals: every cell except the free center.
pub const GOAL_COUNT: usize = BOARD_CELLS - FREE_CELLS;

/// Goals shuffled onto the non-center cells of each board.
///
/// The array length is tied to the board size, so a catalog with a missing or
/// extra entry does not compile.
pub const GOALS: [Goal; GOAL_COUNT] = [
    Goal {
        name: "Shadows",
        description: "Make shadows the main subject of your photograph. Focus on their shapes, patterns, and how they define or obscure light.",
    },
    Goal {
        name: "Mostly dark",
        description: "Create a high-contrast image where the majority of the frame is dark (low-key). Focus on using small amounts of light to highlight your subject.",
    },
    Goal {
        name: "Lots of little details",
        description: "Get up close and focus on the small, often-overlooked details of objects, textures, or nature. Think macro photography.",
    },
    Goal {
        name: "Get low",
        description: "Change your perspective. Crouch down, kneel, or even lie on the ground to capture a low-angle shot. What new details or drama appear when you photograph from below?",
    },
    Goal {
        name: "Panoramic",
        description: "Capture a wide, expansive scene. This could be a sweeping landscape or an interesting interior. Experiment with your phone or camera's panoramic feature.",
    },
    Goal {
        name: "Tilted Frame (Dutch Angle)",
        description: "Intentionally angle or tilt your camera to create a dynamic, diagonal horizon line. This technique adds an unstable, uneasy, or exciting mood to the composition.",
    },
    Goal {
        name: "Motion Blur",
        description: "Convey the speed of a moving subject by following its movement with the camera at a low shutter speed to create motion blur in the background, or keep the camera fixed and let the subject become blurry",
    },
    Goal {
        name: "Self portrait",
        description: "Create a photo where you are the subject. This doesn't have to be a traditional selfie; it could be a conceptual shot, a photo of your shadow, or a reflection.",
    },
    Goal {
        name: "A single color",
        description: "Choose a dominant color and find subjects or scenes where that color is the main visual element. Focus on its various shades and tones.",
    },
    Goal {
        name: "Color-POW!!!",
        description: "Create a photograph dominated by vibrant, saturated colors. Look for bold color combinations or striking pops of color against a neutral background.",
    },
    Goal {
        name: "Monochrome",
        description: "Shoot for a black and white image. Focus on texture, light, shadow, and composition, as color will not be a factor.",
    },
    Goal {
        name: "Reflections",
        description: "Look for reflections in water, windows, mirrors, or any shiny surface. Play with symmetry, distortion, and how the reflected world interacts with the real one.",
    },
    Goal {
        name: "Typography",
        description: "Find interesting examples of letters, numbers, signs, or graffiti. Focus on the style, texture, and context of the text you photograph.",
    },
    Goal {
        name: "Street portrait",
        description: "Capture a portrait of a person you encounter during the photowalk. Remember to ask for permission! Focus on expression, context, and environment.",
    },
    Goal {
        name: "History",
        description: "Find a subject that tells a story of the past. This could be old architecture, a historical marker, or an object with a sense of age.",
    },
    Goal {
        name: "Look behind",
        description: "Turn around and photograph something that is usually behind you or overlooked. Capture the view in the opposite direction of where you're walking.",
    },
    Goal {
        name: "Abstract",
        description: "Capture an image where the subject is obscured or non-representational. Focus on shapes, lines, textures, and colors to create a piece of visual art.",
    },
    Goal {
        name: "Geometry",
        description: "Focus on lines, shapes, patterns, and forms in your environment. Look for triangles, circles, squares, leading lines, or repeating elements to create a strong, structured composition.",
    },
    Goal {
        name: "Leading Lines",
        description: "Find a composition where lines (roads, fences, shadows, railings) naturally guide the viewer's eye toward your main subject or deeper into the frame. Focus on creating depth and visual flow.",
    },
    Goal {
        name: "Framing",
        description: "Use a doorway, window, arch, or branches to frame your subject inside the picture.",
    },
    Goal {
        name: "Symmetry",
        description: "Find a scene that mirrors itself, horizontally or vertically, and center it precisely.",
    },
    Goal {
        name: "Negative space",
        description: "Let empty space dominate the frame so a small subject stands out on its own.",
    },
    Goal {
        name: "Silhouette",
        description: "Shoot against a bright background so your subject becomes a dark, recognizable outline.",
    },
    Goal {
        name: "Texture",
        description: "Fill the frame with a surface you almost want to touch: bark, rust, fabric, stone.",
    },
];
