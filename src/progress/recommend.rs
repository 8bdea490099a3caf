// src/progress/recommend.rs

use serde::Serialize;

use super::{catalog::ModuleCatalog, stats::ProgressStats};

/// Progress percentage from which an in-progress module counts as nearly done.
pub const NEAR_COMPLETION_THRESHOLD: u32 = 70;
/// Scores below this suggest revisiting a module.
pub const LOW_SCORE_THRESHOLD: u32 = 70;
const EXPLORATION_LIMIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Completion,
    Improvement,
    Exploration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub message: String,
    pub modules: Vec<String>,
}

/// Suggests what the user should do next, highest priority first.
pub fn recommend(stats: &ProgressStats, catalog: &ModuleCatalog) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let near_completion: Vec<String> = stats
        .modules_in_progress
        .iter()
        .filter(|m| m.progress_percentage >= NEAR_COMPLETION_THRESHOLD)
        .map(|m| m.module_id.clone())
        .collect();
    if !near_completion.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Completion,
            priority: Priority::High,
            message: format!(
                "You are close to finishing {} module(s): {}. Keep going!",
                near_completion.len(),
                near_completion.join(", ")
            ),
            modules: near_completion,
        });
    }

    if let Some(low) = stats
        .completed_modules_with_score
        .iter()
        .find(|m| m.score < LOW_SCORE_THRESHOLD)
    {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Improvement,
            priority: Priority::Medium,
            message: format!(
                "Review {} to improve your score of {}%",
                low.module_id, low.score
            ),
            modules: vec![low.module_id.clone()],
        });
    }

    let unexplored: Vec<String> = catalog
        .ids()
        .filter(|id| !stats.module_progress.contains_key(*id))
        .take(EXPLORATION_LIMIT)
        .map(str::to_string)
        .collect();
    if !unexplored.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Exploration,
            priority: Priority::Low,
            message: format!("Discover new subjects: {}", unexplored.join(", ")),
            modules: unexplored,
        });
    }

    recommendations
}
