//! Creator-facing posting suggestions: captions, hashtags, tips and timing.

use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const DEFAULT_CAPTION_CONTEXT: &str = "Can't wait to share what I've been working on!";
pub const DEFAULT_HASHTAG_COUNT: usize = 5;
pub const MIN_CONFIDENCE: f64 = 0.75;
pub const MAX_CONFIDENCE: f64 = 0.95;
const HASHTAG_CATEGORIES_PICKED: usize = 3;
const HASHTAGS_PER_CATEGORY: usize = 2;
const PEAK_HOURS: [u32; 4] = [9, 12, 18, 21];
const PEAK_MINUTE: u32 = 30;

pub static CAPTION_TEMPLATES: [&str; 8] = [
    "Golden hour hits different ✨ {context}",
    "Creating moments worth remembering 📸 {context}",
    "Less is more, but more is fun 🎨 {context}",
    "The details make the difference ⚡ {context}",
    "Chasing light and good vibes ☀️ {context}",
    "Story behind every frame 🖼️ {context}",
    "Making magic with pixels ✨ {context}",
    "Elevating the everyday 🌟 {context}",
];

pub static HASHTAG_CATEGORIES: [(&str, [&str; 4]); 6] = [
    (
        "aesthetic",
        ["#aesthetic", "#visualsoflife", "#artofvisuals", "#creativecontent"],
    ),
    (
        "photography",
        ["#photography", "#photooftheday", "#instagood", "#picoftheday"],
    ),
    (
        "content",
        ["#contentcreator", "#creatorlife", "#digitalcreator", "#influence"],
    ),
    ("design", ["#design", "#minimal", "#creative", "#art"]),
    ("lifestyle", ["#lifestyle", "#dailylife", "#moments", "#life"]),
    ("mood", ["#vibes", "#mood", "#feels", "#goodvibes"]),
];

pub static ENGAGEMENT_TIPS: [&str; 8] = [
    "Posts with lighter backgrounds tend to perform 24% better in this category. Try increasing brightness!",
    "Consistent color grading across your feed increases follower retention by 32%.",
    "Images with natural lighting get 40% more engagement than artificial lighting.",
    "Posts published during peak hours (6-9 PM) receive 2.3x more initial engagement.",
    "Using 3-5 relevant hashtags performs better than using 30 generic ones.",
    "Carousels get 1.4x more reach than single images. Consider a before/after comparison!",
    "Faces in photos increase engagement by 38%. Show yourself!",
    "Blue-toned images get 24% more likes than warm-toned ones on average.",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub best_posting_time: String,
    pub suggested_caption: String,
    pub hashtags: Vec<String>,
    pub engagement_tip: String,
    pub confidence_score: f64,
}

/// Next peak slot strictly after `now`, else tomorrow's first slot.
pub fn best_posting_time_at(now: NaiveDateTime) -> String {
    let now_time = now.time();
    PEAK_HOURS
        .iter()
        .filter_map(|hour| NaiveTime::from_hms_opt(*hour, PEAK_MINUTE, 0))
        .find(|slot| *slot > now_time)
        .map(|slot| format!("Today, {:02}:{:02}", slot.hour(), slot.minute()))
        .unwrap_or_else(|| format!("Tomorrow, {:02}:{:02}", PEAK_HOURS[0], PEAK_MINUTE))
}

pub fn best_posting_time() -> String {
    best_posting_time_at(Local::now().naive_local())
}

pub struct InsightsGenerator<R: Rng> {
    rng: R,
}

impl InsightsGenerator<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> InsightsGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Blank or missing context uses the default line.
    pub fn caption(&mut self, context: Option<&str>) -> String {
        let context = context
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CAPTION_CONTEXT);
        let template = CAPTION_TEMPLATES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(CAPTION_TEMPLATES[0]);
        template.replace("{context}", context)
    }

    /// Two distinct tags from each of three random categories, shuffled, capped at `count`.
    pub fn hashtags(&mut self, count: usize) -> Vec<String> {
        let mut categories: Vec<&[&str; 4]> =
            HASHTAG_CATEGORIES.iter().map(|(_, tags)| tags).collect();
        categories.shuffle(&mut self.rng);

        let mut picked: Vec<String> = Vec::new();
        for tags in categories.into_iter().take(HASHTAG_CATEGORIES_PICKED) {
            picked.extend(
                tags.choose_multiple(&mut self.rng, HASHTAGS_PER_CATEGORY)
                    .map(|tag| tag.to_string()),
            );
        }
        picked.shuffle(&mut self.rng);
        picked.truncate(count);
        picked
    }

    pub fn engagement_tip(&mut self) -> &'static str {
        ENGAGEMENT_TIPS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(ENGAGEMENT_TIPS[0])
    }

    pub fn confidence_score(&mut self) -> f64 {
        let raw: f64 = self.rng.gen_range(MIN_CONFIDENCE..=MAX_CONFIDENCE);
        (raw * 100.0).round() / 100.0
    }

    pub fn generate_at(&mut self, now: NaiveDateTime, context: Option<&str>) -> Insights {
        Insights {
            best_posting_time: best_posting_time_at(now),
            suggested_caption: self.caption(context),
            hashtags: self.hashtags(DEFAULT_HASHTAG_COUNT),
            engagement_tip: self.engagement_tip().to_string(),
            confidence_score: self.confidence_score(),
        }
    }

    pub fn generate(&mut self, context: Option<&str>) -> Insights {
        self.generate_at(Local::now().naive_local(), context)
    }
}
