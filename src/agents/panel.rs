use std::time::Instant;

use futures::future::join_all;
use tracing::info;

use super::profiles::DEFAULT_PANEL;
use super::specialist::{SpecialistAgent, SpecialistProfile};
use super::vision::SharedVisionClient;
use super::AgentAnalysis;

/// Runs every specialist against the same image and waits for all of them.
#[derive(Clone)]
pub struct AgentPanel {
    agents: Vec<SpecialistAgent>,
}

impl AgentPanel {
    pub fn new(agents: Vec<SpecialistAgent>) -> Self {
        Self { agents }
    }

    /// The five built-in specialists sharing one optional vision backend.
    pub fn with_default_profiles(client: Option<SharedVisionClient>) -> Self {
        Self::from_profiles(&DEFAULT_PANEL, client)
    }

    pub fn from_profiles(
        profiles: &[&'static SpecialistProfile],
        client: Option<SharedVisionClient>,
    ) -> Self {
        let agents = profiles
            .iter()
            .map(|profile| SpecialistAgent::new(profile, client.clone()))
            .collect();
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agent_names(&self) -> Vec<&'static str> {
        self.agents
            .iter()
            .map(|agent| agent.profile().agent_name)
            .collect()
    }

    pub fn profiles(&self) -> Vec<&'static SpecialistProfile> {
        self.agents.iter().map(SpecialistAgent::profile).collect()
    }

    /// Results come back in panel order regardless of completion order.
    pub async fn analyze_all(&self, image_url: &str, user_intent: &str) -> Vec<AgentAnalysis> {
        let started = Instant::now();
        info!(agents = self.agents.len(), "running agent panel");
        let analyses = join_all(
            self.agents
                .iter()
                .map(|agent| agent.analyze(image_url, user_intent)),
        )
        .await;
        info!(
            agents = analyses.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "agent panel complete"
        );
        analyses
    }
}
