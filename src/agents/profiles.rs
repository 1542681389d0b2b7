//! Persona and fallback data for the built-in specialists.

use super::specialist::{KeywordRule, SpecialistProfile};

pub static COMPOSITION: SpecialistProfile = SpecialistProfile {
    key: "composition",
    agent_name: "CompositionAgent",
    persona: concat!(
        "You are a composition specialist for image enhancement.\n",
        "You analyze images for:\n",
        "- Rule of thirds alignment and balance\n",
        "- Focal point clarity and placement\n",
        "- Visual weight distribution\n",
        "- Leading lines and visual flow\n",
        "- Framing and cropping opportunities\n",
        "- Negative space usage\n",
        "- Subject positioning\n\n",
        "Provide specific, actionable enhancement suggestions that preserve the original\n",
        "composition while improving visual impact. Focus only on compositional elements."
    ),
    focus: &[
        "framing",
        "rule_of_thirds",
        "focal_points",
        "balance",
        "cropping",
        "leading_lines",
    ],
    directive_rules: &[],
    default_directive:
        "enhance focal point clarity and visual balance while maintaining subject positioning",
    default_observations: &[
        "subject positioned in frame",
        "background elements present",
        "visual balance detected",
    ],
    default_priorities: &["focal point emphasis", "balanced framing", "clean background"],
};

pub static LIGHTING: SpecialistProfile = SpecialistProfile {
    key: "lighting",
    agent_name: "LightingAgent",
    persona: concat!(
        "You are a lighting specialist for image enhancement.\n",
        "You analyze images for:\n",
        "- Overall exposure levels (underexposed/overexposed/balanced)\n",
        "- Shadow detail and depth\n",
        "- Highlight preservation and recovery\n",
        "- Light direction and quality (soft/hard)\n",
        "- Time of day lighting characteristics\n",
        "- Contrast ratios\n",
        "- Dynamic range utilization\n\n",
        "Provide specific, actionable lighting enhancement suggestions that improve\n",
        "the image's luminosity while maintaining natural appearance. Focus only on\n",
        "lighting and exposure elements."
    ),
    focus: &[
        "exposure",
        "shadows",
        "highlights",
        "contrast",
        "light_direction",
        "dynamic_range",
    ],
    directive_rules: &[
        KeywordRule {
            keywords: &["bright"],
            directive: "increase exposure and lift shadows for brighter overall appearance",
        },
        KeywordRule {
            keywords: &["moody", "dark"],
            directive: "deepen shadows and enhance contrast for dramatic lighting",
        },
    ],
    default_directive: "balance exposure with natural shadow depth and preserved highlights",
    default_observations: &[
        "natural lighting detected",
        "shadow areas present",
        "highlight detail visible",
    ],
    default_priorities: &["balanced exposure", "shadow detail", "highlight preservation"],
};

pub static COLOR: SpecialistProfile = SpecialistProfile {
    key: "color",
    agent_name: "ColorAgent",
    persona: concat!(
        "You are a color specialist for image enhancement.\n",
        "You analyze images for:\n",
        "- Color palette and harmony (complementary, analogous, etc.)\n",
        "- Saturation levels (muted/vibrant)\n",
        "- Color temperature (warm/cool)\n",
        "- Color cast issues\n",
        "- Skin tone accuracy\n",
        "- Color contrast and pop\n",
        "- Dominant vs accent colors\n\n",
        "Provide specific, actionable color enhancement suggestions that improve\n",
        "the image's color impact while maintaining natural appearance. Focus only on\n",
        "color and palette elements."
    ),
    focus: &[
        "palette",
        "saturation",
        "temperature",
        "harmony",
        "vibrancy",
        "color_balance",
    ],
    directive_rules: &[
        KeywordRule {
            keywords: &["vibrant"],
            directive: "boost saturation and enhance color vibrancy for eye-catching palette",
        },
        KeywordRule {
            keywords: &["warm"],
            directive: "shift temperature warmer with golden tones and enhanced warmth",
        },
        KeywordRule {
            keywords: &["cool"],
            directive: "shift temperature cooler with blue tones and crisp appearance",
        },
        KeywordRule {
            keywords: &["vintage"],
            directive: "apply muted tones with slight desaturation and warm color cast",
        },
    ],
    default_directive: "enhance color harmony and saturation for balanced, appealing palette",
    default_observations: &[
        "natural color palette",
        "moderate saturation",
        "balanced temperature",
    ],
    default_priorities: &["color harmony", "saturation balance", "natural skin tones"],
};

pub static MOOD: SpecialistProfile = SpecialistProfile {
    key: "mood",
    agent_name: "MoodAgent",
    persona: concat!(
        "You are a mood and atmosphere specialist for image enhancement.\n",
        "You analyze images for:\n",
        "- Emotional tone (happy, serene, dramatic, mysterious, etc.)\n",
        "- Atmospheric qualities (airy, moody, warm, cool, etc.)\n",
        "- Storytelling elements\n",
        "- Visual energy (calm, dynamic, intense)\n",
        "- Genre/style alignment (cinematic, editorial, lifestyle, etc.)\n",
        "- Viewer emotional response\n",
        "- Overall vibe and feeling\n\n",
        "Provide specific, actionable mood enhancement suggestions that amplify\n",
        "the image's emotional impact while respecting the original intent. Focus only on\n",
        "mood and atmospheric elements."
    ),
    focus: &[
        "emotional_tone",
        "atmosphere",
        "storytelling",
        "visual_energy",
        "genre_style",
        "vibe",
    ],
    directive_rules: &[
        KeywordRule {
            keywords: &["cinematic"],
            directive: "apply cinematic atmosphere with dramatic depth and film-like quality",
        },
        KeywordRule {
            keywords: &["moody"],
            directive: "deepen atmospheric tension with mysterious, contemplative qualities",
        },
        KeywordRule {
            keywords: &["bright", "happy"],
            directive: "enhance uplifting, positive atmosphere with fresh, inviting energy",
        },
        KeywordRule {
            keywords: &["minimal"],
            directive: "create calm, clean atmosphere with serene, uncluttered feeling",
        },
    ],
    default_directive:
        "amplify natural mood with enhanced atmospheric depth and emotional resonance",
    default_observations: &[
        "natural atmosphere present",
        "authentic mood captured",
        "engaging visual story",
    ],
    default_priorities: &["emotional impact", "atmospheric depth", "authentic feeling"],
};

pub static DETAIL: SpecialistProfile = SpecialistProfile {
    key: "detail",
    agent_name: "DetailAgent",
    persona: concat!(
        "You are a detail and clarity specialist for image enhancement.\n",
        "You analyze images for:\n",
        "- Overall sharpness and focus\n",
        "- Texture definition and micro-contrast\n",
        "- Noise levels and grain\n",
        "- Edge definition and clarity\n",
        "- Fine detail preservation\n",
        "- Background blur quality (bokeh)\n",
        "- Artifact detection\n\n",
        "Provide specific, actionable detail enhancement suggestions that improve\n",
        "image clarity while maintaining natural appearance. Focus only on\n",
        "sharpness, texture, and detail elements."
    ),
    focus: &["sharpness", "texture", "clarity", "noise", "edges", "fine_detail"],
    directive_rules: &[],
    default_directive:
        "enhance sharpness and clarity while preserving natural texture and minimizing noise",
    default_observations: &[
        "acceptable sharpness level",
        "texture detail visible",
        "minimal noise detected",
    ],
    default_priorities: &["subject sharpness", "texture definition", "noise reduction"],
};

/// Panel order used by the combiner summary and the HTTP surface.
pub static DEFAULT_PANEL: [&SpecialistProfile; 5] =
    [&COMPOSITION, &LIGHTING, &COLOR, &MOOD, &DETAIL];
