// src/models/progress.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::progress::{CompletedModule, ModuleProgress, ProgressStats, Recommendation};

/// DTO for starting (or resuming) a module.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartModuleRequest {
    #[validate(required(message = "moduleId is required."), length(min = 1, max = 64))]
    pub module_id: Option<String>,
}

/// DTO for recording the answer to one question.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerQuestionRequest {
    #[validate(required(message = "moduleId is required."), length(min = 1, max = 64))]
    pub module_id: Option<String>,
    #[validate(required(message = "questionIndex is required."))]
    pub question_index: Option<u32>,
    #[validate(required(message = "isCorrect is required."))]
    pub is_correct: Option<bool>,
    /// Seconds; defaults to 0. At most one day.
    #[validate(range(max = 86_400, message = "timeSpent must be at most 86400 seconds."))]
    pub time_spent: Option<u64>,
}

/// DTO for resetting a module.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetModuleRequest {
    #[validate(required(message = "moduleId is required."), length(min = 1, max = 64))]
    pub module_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartModuleResponse {
    pub message: String,
    pub progress: ModuleProgress,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerQuestionResponse {
    pub message: String,
    pub progress: ModuleProgress,
    pub is_module_completed: bool,
}

/// Legacy progress shape read by older clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleProgressResponse {
    pub current_question: u32,
    pub score: u32,
    pub completed_modules: Vec<String>,
    pub completed_modules_with_score: Vec<CompletedModule>,
}

/// Detailed progress: statistics plus recommendations.
#[derive(Debug, Serialize)]
pub struct ProgressReport {
    #[serde(flatten)]
    pub stats: ProgressStats,
    pub recommendations: Vec<Recommendation>,
}
