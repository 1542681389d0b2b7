use tracing::{info, warn};

use super::vision::{SharedVisionClient, VisionRequest};
use super::AgentAnalysis;

pub const DEFAULT_PARSED_CONFIDENCE: f32 = 0.8;
pub const FALLBACK_CONFIDENCE: f32 = 0.7;

#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub directive: &'static str,
}

/// Everything that distinguishes one specialist from another.
#[derive(Debug, Clone, Copy)]
pub struct SpecialistProfile {
    pub key: &'static str,
    pub agent_name: &'static str,
    pub persona: &'static str,
    pub focus: &'static [&'static str],
    pub directive_rules: &'static [KeywordRule],
    pub default_directive: &'static str,
    pub default_observations: &'static [&'static str],
    pub default_priorities: &'static [&'static str],
}

impl SpecialistProfile {
    /// First rule with a keyword contained in the lowercased intent wins.
    pub fn directive_for(&self, user_intent: &str) -> &'static str {
        let intent = user_intent.to_lowercase();
        self.directive_rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| intent.contains(kw)))
            .map(|rule| rule.directive)
            .unwrap_or(self.default_directive)
    }

    pub fn fallback_analysis(&self, user_intent: &str) -> AgentAnalysis {
        AgentAnalysis {
            agent_name: self.agent_name.to_string(),
            confidence: FALLBACK_CONFIDENCE,
            observations: to_owned_list(self.default_observations),
            enhancement_directive: self.directive_for(user_intent).to_string(),
            priority_adjustments: to_owned_list(self.default_priorities),
        }
    }

    /// Reads the four labeled fields. Each missing field falls back on its own.
    pub fn parse_response(&self, content: &str, user_intent: &str) -> AgentAnalysis {
        let mut observations = Vec::new();
        let mut directive = String::new();
        let mut priorities = Vec::new();
        let mut confidence = DEFAULT_PARSED_CONFIDENCE;

        for line in content.trim().lines().map(str::trim) {
            if let Some(rest) = line.strip_prefix("OBSERVATIONS:") {
                observations = split_list(rest);
            } else if let Some(rest) = line.strip_prefix("DIRECTIVE:") {
                directive = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("PRIORITIES:") {
                priorities = split_list(rest);
            } else if let Some(rest) = line.strip_prefix("CONFIDENCE:") {
                confidence = parse_confidence(rest);
            }
        }

        if directive.is_empty() {
            directive = self.directive_for(user_intent).to_string();
        }
        if observations.is_empty() {
            observations = to_owned_list(self.default_observations);
        }
        if priorities.is_empty() {
            priorities = to_owned_list(self.default_priorities);
        }

        AgentAnalysis {
            agent_name: self.agent_name.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            observations,
            enhancement_directive: directive,
            priority_adjustments: priorities,
        }
    }
}

/// One specialist bound to an optional vision backend.
#[derive(Clone)]
pub struct SpecialistAgent {
    profile: &'static SpecialistProfile,
    client: Option<SharedVisionClient>,
}

impl SpecialistAgent {
    pub fn new(profile: &'static SpecialistProfile, client: Option<SharedVisionClient>) -> Self {
        Self { profile, client }
    }

    pub fn profile(&self) -> &'static SpecialistProfile {
        self.profile
    }

    /// Never fails: any backend problem degrades to the profile's fallback.
    pub async fn analyze(&self, image_url: &str, user_intent: &str) -> AgentAnalysis {
        let agent = self.profile.agent_name;
        info!(agent, "starting analysis");

        let Some(client) = self.client.as_ref() else {
            warn!(agent, "no vision credential configured, using fallback");
            return self.profile.fallback_analysis(user_intent);
        };

        let request = VisionRequest {
            persona: self.profile.persona.to_string(),
            image_url: image_url.to_string(),
            user_intent: user_intent.to_string(),
        };
        match client.complete(&request).await {
            Ok(content) => self.profile.parse_response(content.as_str(), user_intent),
            Err(error) => {
                warn!(agent, error = %error, "analysis failed, using fallback");
                self.profile.fallback_analysis(user_intent)
            }
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_confidence(raw: &str) -> f32 {
    match raw.trim().parse::<f32>() {
        Ok(value) if !value.is_nan() => value,
        _ => DEFAULT_PARSED_CONFIDENCE,
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use crate::agents::profiles::{COLOR, COMPOSITION, LIGHTING, MOOD};
    use crate::agents::vision::{VisionClient, VisionError};

    const WELL_FORMED: &str = "OBSERVATIONS: warm highlights, soft shadows, centered subject\n\
        DIRECTIVE: lift midtones gently\n\
        PRIORITIES: midtone lift, highlight roll-off, skin tones\n\
        CONFIDENCE: 0.92";

    #[test]
    fn parses_all_four_fields() {
        let analysis = LIGHTING.parse_response(WELL_FORMED, "anything");
        assert_eq!(analysis.agent_name, "LightingAgent");
        assert_eq!(
            analysis.observations,
            vec!["warm highlights", "soft shadows", "centered subject"]
        );
        assert_eq!(analysis.enhancement_directive, "lift midtones gently");
        assert_eq!(
            analysis.priority_adjustments,
            vec!["midtone lift", "highlight roll-off", "skin tones"]
        );
        assert!((analysis.confidence - 0.92).abs() < 1e-6);
    }

    #[test]
    fn confidence_is_clamped() {
        let high = COLOR.parse_response("DIRECTIVE: x\nCONFIDENCE: 1.5", "");
        assert_eq!(high.confidence, 1.0);
        let low = COLOR.parse_response("DIRECTIVE: x\nCONFIDENCE: -3", "");
        assert_eq!(low.confidence, 0.0);
    }

    #[test]
    fn unparsable_or_missing_confidence_defaults() {
        let garbage = COLOR.parse_response("DIRECTIVE: x\nCONFIDENCE: very sure", "");
        assert_eq!(garbage.confidence, DEFAULT_PARSED_CONFIDENCE);
        let nan = COLOR.parse_response("DIRECTIVE: x\nCONFIDENCE: NaN", "");
        assert_eq!(nan.confidence, DEFAULT_PARSED_CONFIDENCE);
        let missing = COLOR.parse_response("DIRECTIVE: x", "");
        assert_eq!(missing.confidence, DEFAULT_PARSED_CONFIDENCE);
    }

    #[test]
    fn missing_directive_uses_keyword_default() {
        let content = "OBSERVATIONS: dull palette\nPRIORITIES: pop\nCONFIDENCE: 0.9";
        let analysis = COLOR.parse_response(content, "Make it VIBRANT please");
        assert_eq!(
            analysis.enhancement_directive,
            "boost saturation and enhance color vibrancy for eye-catching palette"
        );
        assert_eq!(analysis.observations, vec!["dull palette"]);
        assert!((analysis.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn missing_lists_fall_back_independently() {
        let analysis = COMPOSITION.parse_response("DIRECTIVE: crop tighter\nOBSERVATIONS: , ,", "");
        assert_eq!(analysis.enhancement_directive, "crop tighter");
        assert_eq!(
            analysis.observations,
            to_owned_list(COMPOSITION.default_observations)
        );
        assert_eq!(
            analysis.priority_adjustments,
            to_owned_list(COMPOSITION.default_priorities)
        );
    }

    #[test]
    fn keyword_rules_respect_order() {
        assert_eq!(
            LIGHTING.directive_for("bright but dark"),
            "increase exposure and lift shadows for brighter overall appearance"
        );
        assert_eq!(
            LIGHTING.directive_for("something DARK"),
            "deepen shadows and enhance contrast for dramatic lighting"
        );
        assert_eq!(MOOD.directive_for("happy vibes"), MOOD.directive_rules[2].directive);
        assert_eq!(MOOD.directive_for("plain"), MOOD.default_directive);
    }

    struct CountingClient {
        calls: AtomicUsize,
        reply: Result<String, u16>,
    }

    #[async_trait]
    impl VisionClient for CountingClient {
        async fn complete(&self, _request: &VisionRequest) -> Result<String, VisionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(VisionError::Status {
                    status: *status,
                    body: String::from("upstream down"),
                }),
            }
        }
    }

    #[tokio::test]
    async fn no_client_goes_straight_to_fallback() {
        let agent = SpecialistAgent::new(&COLOR, None);
        let analysis = agent.analyze("https://img/a.png", "warm sunset").await;
        assert_eq!(analysis.confidence, FALLBACK_CONFIDENCE);
        assert_eq!(
            analysis.enhancement_directive,
            "shift temperature warmer with golden tones and enhanced warmth"
        );
    }

    #[tokio::test]
    async fn backend_errors_degrade_to_full_fallback() {
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
            reply: Err(503),
        });
        let agent = SpecialistAgent::new(&LIGHTING, Some(client.clone()));
        let analysis = agent.analyze("https://img/a.png", "moody night").await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(analysis, LIGHTING.fallback_analysis("moody night"));
    }

    #[tokio::test]
    async fn successful_replies_are_parsed() {
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
            reply: Ok(String::from(WELL_FORMED)),
        });
        let agent = SpecialistAgent::new(&LIGHTING, Some(client.clone()));
        let analysis = agent.analyze("https://img/a.png", "anything").await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(analysis.enhancement_directive, "lift midtones gently");
    }
}
