pub mod health;
pub mod quiz;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/quizzes", post(quiz::create_quiz))
        .route("/api/quizzes/:quiz_id/questions", get(quiz::get_quiz_questions))
        .route("/api/quizzes/:quiz_id/submit", post(quiz::submit_quiz))
        .route("/api/quizzes/:quiz_id/result", get(quiz::get_quiz_result))
        .with_state(state)
}
