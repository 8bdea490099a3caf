// src/progress/reconcile.rs

use super::model::{CompletedModule, ProgressState};

/// Brings the legacy mirrors in line with `module_progress`.
///
/// After this call `completed_modules` holds exactly the ids of completed
/// modules and `completed_modules_with_score` holds one entry per completed
/// module that carries a final score. Existing entries keep their position;
/// newly completed modules are appended in id order.
///
/// Returns `true` if anything changed. A second call in a row always
/// returns `false`.
pub fn reconcile(state: &mut ProgressState) -> bool {
    let completed: Vec<&String> = state
        .module_progress
        .iter()
        .filter(|(_, p)| p.is_completed())
        .map(|(id, _)| id)
        .collect();
    // Only modules with a final score can appear in the scored mirror.
    let scored: Vec<(&String, u32, chrono::DateTime<chrono::Utc>)> = state
        .module_progress
        .iter()
        .filter(|(_, p)| p.is_completed())
        .filter_map(|(id, p)| {
            let score = p.final_score?;
            Some((id, score, p.completed_at.unwrap_or(p.started_at)))
        })
        .collect();

    // completedModules
    let mut ids: Vec<String> = Vec::with_capacity(completed.len());
    for id in &state.completed_modules {
        if state.is_module_completed(id) && !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    for id in &completed {
        if !ids.contains(id) {
            ids.push((*id).clone());
        }
    }

    // completedModulesWithScore
    let mut entries: Vec<CompletedModule> = Vec::with_capacity(scored.len());
    for entry in &state.completed_modules_with_score {
        let Some((_, score, _)) = scored.iter().find(|(c, _, _)| **c == entry.module_id) else {
            continue;
        };
        if entries.iter().any(|e| e.module_id == entry.module_id) {
            continue;
        }
        entries.push(CompletedModule {
            score: *score,
            ..entry.clone()
        });
    }
    for (id, score, completed_at) in &scored {
        if !entries.iter().any(|e| &e.module_id == *id) {
            entries.push(CompletedModule {
                module_id: (*id).clone(),
                score: *score,
                completed_at: *completed_at,
            });
        }
    }

    let changed = ids != state.completed_modules || entries != state.completed_modules_with_score;
    state.completed_modules = ids;
    state.completed_modules_with_score = entries;
    changed
}
