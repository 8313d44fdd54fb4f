use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::dto::quiz_dto::{
    ApiResponse, CreateQuizPayload, CreateQuizResponse, SubmitQuizPayload, SubmittedAnswer,
    MSG_INSUFFICIENT_QUESTIONS, MSG_QUIZ_CREATED, MSG_QUIZ_FETCHED, MSG_QUIZ_SUBMITTED,
    MSG_RESULT_FETCHED,
};
use crate::models::question::{CategoryTuple, Difficulty};
use crate::utils::validation::{parse_quiz_id, validate};
use crate::AppState;

#[axum::debug_handler]
pub async fn create_quiz(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuizPayload>,
) -> crate::error::Result<Response> {
    validate(&payload)?;
    let difficulty: Difficulty = payload
        .difficulty
        .parse()
        .map_err(crate::error::Error::BadRequest)?;
    let category = CategoryTuple::new(
        payload.exam.trim(),
        payload.subject.trim(),
        payload.topic.trim(),
        difficulty,
    );

    let assembled = state
        .quiz_assembler
        .create_quiz(&category, payload.num_questions as usize, None)
        .await?;

    let message = if assembled.backfill_attempted {
        MSG_INSUFFICIENT_QUESTIONS
    } else {
        MSG_QUIZ_CREATED
    };
    let quiz = assembled.quiz;
    let response = CreateQuizResponse {
        quiz_id: quiz.id,
        exam: quiz.exam,
        subject: quiz.subject,
        topic: quiz.topic,
        difficulty: quiz.difficulty,
        total_questions: assembled.total_questions,
        ai_generated: assembled.was_generated,
        created_at: quiz.created_at,
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message, response))).into_response())
}

#[axum::debug_handler]
pub async fn get_quiz_questions(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> crate::error::Result<Response> {
    let quiz_id = parse_quiz_id(&quiz_id)?;
    let presented = state.quiz_presenter.present(quiz_id).await?;
    Ok(Json(ApiResponse::ok(MSG_QUIZ_FETCHED, presented)).into_response())
}

#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<SubmitQuizPayload>,
) -> crate::error::Result<Response> {
    let quiz_id = parse_quiz_id(&quiz_id)?;
    let answers = payload
        .answers
        .into_iter()
        .map(SubmittedAnswer::try_from)
        .collect::<crate::error::Result<Vec<_>>>()?;

    let result = state.quiz_grader.submit(quiz_id, &answers).await?;
    Ok(Json(ApiResponse::ok(MSG_QUIZ_SUBMITTED, result)).into_response())
}

#[axum::debug_handler]
pub async fn get_quiz_result(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> crate::error::Result<Response> {
    let quiz_id = parse_quiz_id(&quiz_id)?;
    let result = state.quiz_grader.get_result(quiz_id).await?;
    Ok(Json(ApiResponse::ok(MSG_RESULT_FETCHED, result)).into_response())
}
