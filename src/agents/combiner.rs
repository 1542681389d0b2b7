use serde::Serialize;
use tracing::info;

use super::AgentAnalysis;

/// Analyses at or above this confidence lead the prompt.
pub const PRIORITY_CONFIDENCE: f32 = 0.8;
pub const MAX_TECHNICAL_FOCUS: usize = 8;
const PRIORITIES_PER_AGENT: usize = 2;
const DIGEST_OBSERVATIONS: usize = 3;
const CLOSING_CLAUSE: &str =
    "Output: Instagram-optimized, high quality, preserve subject integrity, maintain authenticity";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentDigest {
    pub agent: String,
    pub confidence: f32,
    pub key_observations: Vec<String>,
    pub directive: String,
}

/// Merges analyses into one generation directive, ranked by confidence.
pub fn combine(user_intent: &str, analyses: &[AgentAnalysis]) -> String {
    let mut ranked: Vec<&AgentAnalysis> = analyses.iter().collect();
    // sort_by is stable: equal confidences keep input order
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let (primary, secondary): (Vec<&AgentAnalysis>, Vec<&AgentAnalysis>) = ranked
        .iter()
        .copied()
        .partition(|analysis| analysis.confidence >= PRIORITY_CONFIDENCE);

    let technical: Vec<&str> = ranked
        .iter()
        .flat_map(|analysis| {
            analysis
                .priority_adjustments
                .iter()
                .take(PRIORITIES_PER_AGENT)
                .map(String::as_str)
        })
        .take(MAX_TECHNICAL_FOCUS)
        .collect();

    let mut clauses = vec![format!("Enhance this image: {user_intent}")];
    if !primary.is_empty() {
        clauses.push(format!(
            "Primary enhancements: {}",
            join_directives(primary.as_slice())
        ));
    }
    if !secondary.is_empty() {
        clauses.push(format!(
            "Additional refinements: {}",
            join_directives(secondary.as_slice())
        ));
    }
    if !technical.is_empty() {
        clauses.push(format!("Technical focus: {}", technical.join(", ")));
    }
    clauses.push(String::from(CLOSING_CLAUSE));

    let prompt = clauses.join(". ");
    info!(
        agents = analyses.len(),
        primary = primary.len(),
        chars = prompt.len(),
        "super-prompt generated"
    );
    prompt
}

/// Per-agent digest in input order.
pub fn summarize(analyses: &[AgentAnalysis]) -> Vec<AgentDigest> {
    analyses
        .iter()
        .map(|analysis| AgentDigest {
            agent: analysis.agent_name.clone(),
            confidence: analysis.confidence,
            key_observations: analysis
                .observations
                .iter()
                .take(DIGEST_OBSERVATIONS)
                .cloned()
                .collect(),
            directive: analysis.enhancement_directive.clone(),
        })
        .collect()
}

fn join_directives(analyses: &[&AgentAnalysis]) -> String {
    analyses
        .iter()
        .map(|analysis| analysis.enhancement_directive.as_str())
        .collect::<Vec<_>>()
        .join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn analysis(
        name: &str,
        confidence: f32,
        directive: &str,
        priorities: &[&str],
    ) -> AgentAnalysis {
        AgentAnalysis {
            agent_name: name.to_string(),
            confidence,
            observations: vec![
                String::from("one"),
                String::from("two"),
                String::from("three"),
                String::from("four"),
            ],
            enhancement_directive: directive.to_string(),
            priority_adjustments: priorities.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn buckets_and_orders_directives_by_confidence() {
        let analyses = vec![
            analysis("CompositionAgent", 0.7, "frame", &["a1", "a2", "a3"]),
            analysis("LightingAgent", 0.95, "light", &["b1", "b2"]),
            analysis("ColorAgent", 0.8, "color", &["c1"]),
            analysis("MoodAgent", 0.5, "mood", &[]),
            analysis("DetailAgent", 0.85, "detail", &["e1", "e2", "e3"]),
        ];
        let prompt = combine("make it pop", &analyses);
        assert_eq!(
            prompt,
            "Enhance this image: make it pop. \
             Primary enhancements: light. detail. color. \
             Additional refinements: frame. mood. \
             Technical focus: b1, b2, e1, e2, c1, a1, a2. \
             Output: Instagram-optimized, high quality, preserve subject integrity, maintain authenticity"
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let analyses = vec![
            analysis("CompositionAgent", 0.8, "first", &[]),
            analysis("LightingAgent", 0.8, "second", &[]),
            analysis("ColorAgent", 0.8, "third", &[]),
        ];
        let prompt = combine("x", &analyses);
        assert!(prompt.contains("Primary enhancements: first. second. third"));
        assert!(!prompt.contains("Additional refinements"));
        assert!(!prompt.contains("Technical focus"));
    }

    #[test]
    fn technical_focus_is_capped() {
        let analyses: Vec<AgentAnalysis> = (0..5)
            .map(|i| analysis(&format!("Agent{i}"), 0.6, "d", &["p", "q", "r"]))
            .collect();
        let prompt = combine("x", &analyses);
        let focus = prompt
            .split(". ")
            .find(|clause| clause.starts_with("Technical focus: "))
            .expect("focus clause should exist");
        assert_eq!(focus.trim_start_matches("Technical focus: ").split(", ").count(), 8);
    }

    #[test]
    fn empty_panel_still_produces_intent_and_closing() {
        assert_eq!(
            combine("hello", &[]),
            format!("Enhance this image: hello. {CLOSING_CLAUSE}")
        );
    }

    #[test]
    fn summary_keeps_three_observations() {
        let digests = summarize(&[analysis("LightingAgent", 0.9, "light", &[])]);
        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0].agent, "LightingAgent");
        assert_eq!(digests[0].key_observations, vec!["one", "two", "three"]);
        assert_eq!(digests[0].directive, "light");
    }
}
