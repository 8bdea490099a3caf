// src/progress/stats.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    catalog::ModuleCatalog,
    model::{CompletedModule, ModuleProgress, ModuleStatus, ProgressState},
    percent, rounded_div,
};

/// Headline numbers for the progress dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub global_progress: u32,
    pub total_available_modules: usize,
    pub completed_modules_count: usize,
    pub modules_in_progress_count: usize,
    pub average_score: u32,
    pub best_score: u32,
    pub global_accuracy: u32,
    pub total_questions_answered: u64,
    pub total_correct_answers: u64,
    /// Minutes.
    pub total_time_spent: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInProgress {
    pub module_id: String,
    pub questions_answered: u32,
    pub total_questions: u32,
    pub progress_percentage: u32,
    /// Accuracy over the questions answered so far.
    pub current_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectScore {
    pub module_id: String,
    pub score: u32,
    pub name: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub date: DateTime<Utc>,
    pub module_id: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleAccuracy {
    pub module_id: String,
    pub accuracy: u32,
    pub questions_answered: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub score_distribution: Vec<CompletedModule>,
    pub progress_timeline: Vec<TimelinePoint>,
    pub accuracy_by_module: Vec<ModuleAccuracy>,
}

/// Full statistics derived from one user's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub global_stats: GlobalStats,
    /// Completed modules in legacy-mirror order.
    pub completed_modules_with_score: Vec<CompletedModule>,
    pub modules_in_progress: Vec<ModuleInProgress>,
    pub module_progress: BTreeMap<String, ModuleProgress>,
    /// Completed modules, best score first.
    pub subject_analysis: Vec<SubjectScore>,
    pub chart_data: ChartData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub last_module_completed: Option<CompletedModule>,
    pub total_sessions: usize,
}

/// Lightweight figures for the home dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub global_progress: u32,
    /// Number of completed modules.
    pub total_modules: usize,
    pub average_score: u32,
    pub total_available_modules: usize,
    pub modules_in_progress_count: usize,
    pub recent_activity: RecentActivity,
}

/// Completed modules with their current final score.
///
/// Ordered as in the legacy `completed_modules_with_score` list, followed by
/// any completed module that list does not mention yet, in id order. This
/// keeps "first" stable even on a document that was never reconciled.
fn completed_modules(state: &ProgressState) -> Vec<CompletedModule> {
    let entry = |p: &ModuleProgress| -> Option<CompletedModule> {
        if !p.is_completed() {
            return None;
        }
        Some(CompletedModule {
            module_id: p.module_id.clone(),
            score: p.final_score?,
            completed_at: p.completed_at.unwrap_or(p.started_at),
        })
    };

    let mut out: Vec<CompletedModule> = Vec::new();
    for legacy in &state.completed_modules_with_score {
        if out.iter().any(|m| m.module_id == legacy.module_id) {
            continue;
        }
        if let Some(mut current) = state.module(&legacy.module_id).and_then(entry) {
            current.completed_at = legacy.completed_at;
            out.push(current);
        }
    }
    for progress in state.module_progress.values() {
        if out.iter().any(|m| m.module_id == progress.module_id) {
            continue;
        }
        if let Some(current) = entry(progress) {
            out.push(current);
        }
    }
    out
}

fn average_score(completed: &[CompletedModule]) -> u32 {
    let sum: u64 = completed.iter().map(|m| u64::from(m.score)).sum();
    u32::try_from(rounded_div(sum, completed.len() as u64)).unwrap_or(u32::MAX)
}

/// Derives every dashboard statistic from a user's progress.
pub fn compute(state: &ProgressState, catalog: &ModuleCatalog) -> ProgressStats {
    let completed = completed_modules(state);

    let modules_in_progress: Vec<ModuleInProgress> = state
        .module_progress
        .values()
        .filter(|p| p.status == ModuleStatus::InProgress)
        .map(|p| ModuleInProgress {
            module_id: p.module_id.clone(),
            questions_answered: p.questions_answered,
            total_questions: p.total_questions,
            progress_percentage: percent(
                u64::from(p.questions_answered),
                u64::from(p.total_questions),
            ),
            current_score: percent(u64::from(p.correct_answers), u64::from(p.questions_answered)),
        })
        .collect();

    let total_questions_answered: u64 = state
        .module_progress
        .values()
        .map(|p| u64::from(p.questions_answered))
        .sum();
    let total_correct_answers: u64 = state
        .module_progress
        .values()
        .map(|p| u64::from(p.correct_answers))
        .sum();
    let total_seconds = state
        .module_progress
        .values()
        .map(ModuleProgress::time_spent)
        .fold(0, u64::saturating_add);

    let global_stats = GlobalStats {
        global_progress: percent(completed.len() as u64, catalog.len() as u64).min(100),
        total_available_modules: catalog.len(),
        completed_modules_count: completed.len(),
        modules_in_progress_count: modules_in_progress.len(),
        average_score: average_score(&completed),
        best_score: completed.iter().map(|m| m.score).max().unwrap_or(0),
        global_accuracy: percent(total_correct_answers, total_questions_answered),
        total_questions_answered,
        total_correct_answers,
        total_time_spent: rounded_div(total_seconds, 60),
    };

    let mut subject_analysis: Vec<SubjectScore> = completed
        .iter()
        .map(|m| {
            let definition = catalog.get(&m.module_id);
            SubjectScore {
                module_id: m.module_id.clone(),
                score: m.score,
                name: definition.map_or_else(|| m.module_id.clone(), |d| d.name.clone()),
                emoji: definition.map_or_else(|| "📚".to_string(), |d| d.emoji.clone()),
            }
        })
        .collect();
    // Stable: ties keep legacy order.
    subject_analysis.sort_by(|a, b| b.score.cmp(&a.score));

    let mut progress_timeline: Vec<TimelinePoint> = state
        .module_progress
        .values()
        .filter_map(|p| {
            Some(TimelinePoint {
                date: p.completed_at?,
                module_id: p.module_id.clone(),
                score: p.final_score?,
            })
        })
        .collect();
    progress_timeline.sort_by_key(|t| t.date);

    let accuracy_by_module = state
        .module_progress
        .values()
        .map(|p| ModuleAccuracy {
            module_id: p.module_id.clone(),
            accuracy: percent(u64::from(p.correct_answers), u64::from(p.questions_answered)),
            questions_answered: p.questions_answered,
        })
        .collect();

    ProgressStats {
        global_stats,
        chart_data: ChartData {
            score_distribution: completed.clone(),
            progress_timeline,
            accuracy_by_module,
        },
        completed_modules_with_score: completed,
        modules_in_progress,
        module_progress: state.module_progress.clone(),
        subject_analysis,
    }
}

/// Computes the lighter dashboard figures.
pub fn summarize(state: &ProgressState, catalog: &ModuleCatalog) -> DashboardSummary {
    let completed = completed_modules(state);
    let modules_in_progress_count = state
        .module_progress
        .values()
        .filter(|p| p.status == ModuleStatus::InProgress)
        .count();

    DashboardSummary {
        global_progress: percent(completed.len() as u64, catalog.len() as u64).min(100),
        total_modules: completed.len(),
        average_score: average_score(&completed),
        total_available_modules: catalog.len(),
        modules_in_progress_count,
        recent_activity: RecentActivity {
            last_module_completed: completed.last().cloned(),
            total_sessions: state.module_progress.len(),
        },
    }
}
