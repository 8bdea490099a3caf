// src/progress/tracker.rs

use chrono::{DateTime, Utc};

use super::{
    catalog::ModuleCatalog,
    error::ProgressError,
    model::{ModuleProgress, ModuleStatus, ProgressState, QuestionResult},
    percent,
};

/// Result of [`ModuleTracker::start_module`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    pub progress: ModuleProgress,
    /// `true` when an existing attempt was returned instead of a new one.
    pub resumed: bool,
}

/// Result of [`ModuleTracker::record_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub progress: ModuleProgress,
    pub completed: bool,
}

/// A single answer submitted by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer<'a> {
    pub module_id: &'a str,
    pub question_index: u32,
    pub is_correct: bool,
    pub time_spent: u64,
}

/// Applies progress operations to a user's [`ProgressState`].
///
/// The tracker holds no state of its own; every method mutates the document
/// passed in and never touches storage.
#[derive(Debug, Clone, Copy)]
pub struct ModuleTracker<'a> {
    catalog: &'a ModuleCatalog,
}

impl<'a> ModuleTracker<'a> {
    pub fn new(catalog: &'a ModuleCatalog) -> Self {
        Self { catalog }
    }

    /// Starts a module, or returns the existing attempt unchanged.
    pub fn start_module(
        &self,
        state: &mut ProgressState,
        module_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StartOutcome, ProgressError> {
        if module_id.trim().is_empty() {
            return Err(ProgressError::Validation("moduleId is required".to_string()));
        }

        let definition = self
            .catalog
            .get(module_id)
            .ok_or_else(|| ProgressError::InvalidModule(module_id.to_string()))?;

        if let Some(existing) = state.module_progress.get(module_id) {
            return Ok(StartOutcome {
                progress: existing.clone(),
                resumed: true,
            });
        }

        let progress = ModuleProgress::new(module_id, definition.total_questions, now);
        state
            .module_progress
            .insert(module_id.to_string(), progress.clone());

        Ok(StartOutcome {
            progress,
            resumed: false,
        })
    }

    /// Records one answer, completing the module once every question is answered.
    ///
    /// On error the state is left untouched.
    pub fn record_answer(
        &self,
        state: &mut ProgressState,
        answer: Answer<'_>,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, ProgressError> {
        let progress = state
            .module_progress
            .get_mut(answer.module_id)
            .ok_or_else(|| ProgressError::ModuleNotStarted(answer.module_id.to_string()))?;

        if progress.has_answered(answer.question_index) {
            return Err(ProgressError::DuplicateAnswer {
                module_id: answer.module_id.to_string(),
                question_index: answer.question_index,
            });
        }

        if progress.is_completed() {
            return Err(ProgressError::ModuleAlreadyCompleted(
                answer.module_id.to_string(),
            ));
        }

        progress.question_results.push(QuestionResult {
            question_index: answer.question_index,
            is_correct: answer.is_correct,
            time_spent: answer.time_spent,
            answered_at: now,
        });

        progress.questions_answered = progress.question_results.len() as u32;
        progress.correct_answers = progress
            .question_results
            .iter()
            .filter(|q| q.is_correct)
            .count() as u32;

        if progress.questions_answered >= progress.total_questions {
            progress.status = ModuleStatus::Completed;
            progress.completed_at = Some(now);
            progress.final_score = Some(percent(
                u64::from(progress.correct_answers),
                u64::from(progress.total_questions),
            ));
        } else {
            progress.status = ModuleStatus::InProgress;
        }

        Ok(AnswerOutcome {
            completed: progress.is_completed(),
            progress: progress.clone(),
        })
    }

    /// Deletes the attempt for `module_id`. Returns whether a record existed.
    pub fn reset_module(&self, state: &mut ProgressState, module_id: &str) -> bool {
        state.module_progress.remove(module_id).is_some()
    }

    pub fn get_progress<'s>(
        &self,
        state: &'s ProgressState,
        module_id: &str,
    ) -> Option<&'s ModuleProgress> {
        state.module(module_id)
    }
}
