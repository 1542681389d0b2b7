//! Multi-perspective image analysis and prompt synthesis.

pub mod combiner;
pub mod panel;
pub mod profiles;
pub mod specialist;
pub mod vision;

use serde::{Deserialize, Serialize};

pub use combiner::{combine, summarize, AgentDigest, PRIORITY_CONFIDENCE};
pub use panel::AgentPanel;
pub use profiles::DEFAULT_PANEL;
pub use specialist::{KeywordRule, SpecialistAgent, SpecialistProfile};
pub use vision::{OpenAiVisionClient, SharedVisionClient, VisionClient, VisionError, VisionRequest};

/// One specialist's view of an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAnalysis {
    pub agent_name: String,
    pub confidence: f32,
    pub observations: Vec<String>,
    pub enhancement_directive: String,
    pub priority_adjustments: Vec<String>,
}
