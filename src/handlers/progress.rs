// src/handlers/progress.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::progress::{
        AnswerQuestionRequest, AnswerQuestionResponse, ProgressReport, ResetModuleRequest,
        SimpleProgressResponse, StartModuleRequest, StartModuleResponse,
    },
    progress::{Answer, ModuleTracker, compute, recommend, summarize},
    state::AppState,
    store::{require_user, update_progress},
    utils::jwt::Claims,
};

/// Starts a module, or resumes it if an attempt already exists.
pub async fn start_module(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<StartModuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let module_id = req.module_id.unwrap_or_default();
    let user_id = claims.user_id()?;

    let tracker = ModuleTracker::new(&state.catalog);
    let (user, outcome) = update_progress(state.store.as_ref(), user_id, |progress| {
        tracker.start_module(progress, &module_id, Utc::now())
    })
    .await?;

    let message = if outcome.resumed {
        tracing::info!("Module {} resumed for {}", module_id, user.username);
        "Module resumed."
    } else {
        tracing::info!("Module {} started for {}", module_id, user.username);
        "Module started."
    };

    Ok(Json(StartModuleResponse {
        message: message.to_string(),
        progress: outcome.progress,
    }))
}

/// Records the answer to one question of a started module.
///
/// * Each question index may be answered once per attempt.
/// * The answer that brings the count to the module's total completes it.
pub async fn answer_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AnswerQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let (Some(module_id), Some(question_index), Some(is_correct)) =
        (req.module_id, req.question_index, req.is_correct)
    else {
        return Err(AppError::BadRequest("Missing answer data".to_string()));
    };
    let time_spent = req.time_spent.unwrap_or(0);
    let user_id = claims.user_id()?;

    let tracker = ModuleTracker::new(&state.catalog);
    let (user, outcome) = update_progress(state.store.as_ref(), user_id, |progress| {
        tracker.record_answer(
            progress,
            Answer {
                module_id: &module_id,
                question_index,
                is_correct,
                time_spent,
            },
            Utc::now(),
        )
    })
    .await?;

    if outcome.completed {
        tracing::info!(
            "Module {} completed by {} with {}%",
            module_id,
            user.username,
            outcome.progress.final_score.unwrap_or(0)
        );
    }

    Ok(Json(AnswerQuestionResponse {
        message: "Answer recorded.".to_string(),
        is_module_completed: outcome.completed,
        progress: outcome.progress,
    }))
}

/// Deletes the current attempt of a module. Resetting a module that was
/// never started is not an error.
pub async fn reset_module(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ResetModuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let module_id = req.module_id.unwrap_or_default();
    let user_id = claims.user_id()?;

    let tracker = ModuleTracker::new(&state.catalog);
    let (user, existed) = update_progress(state.store.as_ref(), user_id, |progress| {
        Ok(tracker.reset_module(progress, &module_id))
    })
    .await?;

    if existed {
        tracing::info!("Module {} reset for {}", module_id, user.username);
    }

    Ok(Json(json!({ "message": "Module reset successfully." })))
}

/// Returns the current attempt of one module.
pub async fn get_module_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(module_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(state.store.as_ref(), claims.user_id()?).await?;

    let progress = ModuleTracker::new(&state.catalog)
        .get_progress(&user.progress, &module_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("No progress for module '{}'", module_id)))?;

    Ok(Json(progress))
}

/// Full statistics, chart data and recommendations.
pub async fn get_detailed_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(state.store.as_ref(), claims.user_id()?).await?;

    let stats = compute(&user.progress, &state.catalog);
    let recommendations = recommend(&stats, &state.catalog);

    Ok(Json(ProgressReport {
        stats,
        recommendations,
    }))
}

/// Legacy progress view for clients without per-module tracking.
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(state.store.as_ref(), claims.user_id()?).await?;
    let progress = user.progress;

    Ok(Json(SimpleProgressResponse {
        current_question: progress.quiz_progress.current_question,
        score: progress.quiz_progress.score,
        completed_modules: progress.completed_modules,
        completed_modules_with_score: progress.completed_modules_with_score,
    }))
}

/// Headline figures for the home dashboard.
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(state.store.as_ref(), claims.user_id()?).await?;
    Ok(Json(summarize(&user.progress, &state.catalog)))
}
