use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteSpec {
    pub method: HttpMethod,
    pub path: &'static str,
}

impl fmt::Display for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Every endpoint the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceRoute {
    Health,
    ApiHealth,
    ListStyles,
    GetStyle,
    StyleDescription,
    Enhance,
    Preview,
    BatchEnhance,
    Download,
    AnalyzeOnly,
    AgentEnhance,
    Insights,
    PostingTime,
    Caption,
    Hashtags,
    Tip,
}

impl ServiceRoute {
    pub fn spec(self) -> RouteSpec {
        let (method, path) = match self {
            Self::Health => (HttpMethod::Get, "/health"),
            Self::ApiHealth => (HttpMethod::Get, "/api/health"),
            Self::ListStyles => (HttpMethod::Get, "/api/styles"),
            Self::GetStyle => (HttpMethod::Get, "/api/styles/{name}"),
            Self::StyleDescription => (HttpMethod::Get, "/api/styles/{name}/description"),
            Self::Enhance => (HttpMethod::Post, "/api/enhance"),
            Self::Preview => (HttpMethod::Post, "/api/enhance/preview"),
            Self::BatchEnhance => (HttpMethod::Post, "/api/enhance/batch"),
            Self::Download => (HttpMethod::Get, "/api/enhance/download/{style}"),
            Self::AnalyzeOnly => (HttpMethod::Post, "/api/agents/analyze-only"),
            Self::AgentEnhance => (HttpMethod::Post, "/api/agents/enhance"),
            Self::Insights => (HttpMethod::Post, "/api/insights"),
            Self::PostingTime => (HttpMethod::Get, "/api/insights/posting-time"),
            Self::Caption => (HttpMethod::Get, "/api/insights/caption"),
            Self::Hashtags => (HttpMethod::Get, "/api/insights/hashtags"),
            Self::Tip => (HttpMethod::Get, "/api/insights/tip"),
        };
        RouteSpec { method, path }
    }
}

pub const SERVICE_ROUTES: [ServiceRoute; 16] = [
    ServiceRoute::Health,
    ServiceRoute::ApiHealth,
    ServiceRoute::ListStyles,
    ServiceRoute::GetStyle,
    ServiceRoute::StyleDescription,
    ServiceRoute::Enhance,
    ServiceRoute::Preview,
    ServiceRoute::BatchEnhance,
    ServiceRoute::Download,
    ServiceRoute::AnalyzeOnly,
    ServiceRoute::AgentEnhance,
    ServiceRoute::Insights,
    ServiceRoute::PostingTime,
    ServiceRoute::Caption,
    ServiceRoute::Hashtags,
    ServiceRoute::Tip,
];

pub fn route_catalog() -> Vec<ServiceRoute> {
    let mut seen = BTreeSet::new();

    for route in SERVICE_ROUTES {
        let spec = route.spec();
        assert!(
            spec.path.starts_with('/'),
            "route path must start with '/': {spec}"
        );
        assert!(seen.insert(spec), "duplicate route in service list: {spec}");
    }

    SERVICE_ROUTES.to_vec()
}
