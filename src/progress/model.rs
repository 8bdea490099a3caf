// src/progress/model.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of one module attempt.
/// Only ever moves forward; a reset deletes the record instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Outcome of a single answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_index: u32,
    pub is_correct: bool,
    /// Seconds spent on the question.
    #[serde(default)]
    pub time_spent: u64,
    pub answered_at: DateTime<Utc>,
}

/// Progress of one user through one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub module_id: String,
    #[serde(default)]
    pub questions_answered: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub status: ModuleStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Percentage of correct answers, set once the module is completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<u32>,
    /// Answers in the order they were given.
    #[serde(default)]
    pub question_results: Vec<QuestionResult>,
}

impl ModuleProgress {
    pub fn new(module_id: &str, total_questions: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            module_id: module_id.to_string(),
            questions_answered: 0,
            total_questions,
            correct_answers: 0,
            status: ModuleStatus::InProgress,
            started_at,
            completed_at: None,
            final_score: None,
            question_results: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ModuleStatus::Completed
    }

    pub fn has_answered(&self, question_index: u32) -> bool {
        self.question_results
            .iter()
            .any(|q| q.question_index == question_index)
    }

    /// Total seconds spent across every answered question. Saturates.
    pub fn time_spent(&self) -> u64 {
        self.question_results
            .iter()
            .map(|q| q.time_spent)
            .fold(0, u64::saturating_add)
    }
}

/// Legacy `completedModulesWithScore` entry, read by older clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedModule {
    pub module_id: String,
    pub score: u32,
    pub completed_at: DateTime<Utc>,
}

/// Legacy single-quiz progress, kept for clients without per-module tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgress {
    #[serde(default)]
    pub current_question: u32,
    #[serde(default)]
    pub score: u32,
}

/// Everything a user owns regarding quiz progress.
///
/// This is the document persisted alongside the user record. The
/// `completed_modules` and `completed_modules_with_score` fields are mirrors
/// of `module_progress`, maintained by [`crate::progress::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    #[serde(default)]
    pub module_progress: BTreeMap<String, ModuleProgress>,
    #[serde(default)]
    pub completed_modules: Vec<String>,
    #[serde(default)]
    pub completed_modules_with_score: Vec<CompletedModule>,
    #[serde(default)]
    pub quiz_progress: QuizProgress,
}

impl ProgressState {
    pub fn module(&self, module_id: &str) -> Option<&ModuleProgress> {
        self.module_progress.get(module_id)
    }

    pub fn is_module_completed(&self, module_id: &str) -> bool {
        self.module(module_id).is_some_and(ModuleProgress::is_completed)
    }
}
