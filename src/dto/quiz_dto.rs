use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::{Difficulty, OptionLabel, QuestionSource};
use crate::models::quiz::Quiz;
use crate::utils::validation::{validate_difficulty, validate_not_blank};

pub const MAX_QUESTIONS_PER_QUIZ: u32 = 50;

pub const MSG_QUIZ_CREATED: &str = "Quiz created successfully";
pub const MSG_INSUFFICIENT_QUESTIONS: &str = "Insufficient questions, generating from AI...";
pub const MSG_QUIZ_FETCHED: &str = "Quiz questions fetched successfully";
pub const MSG_QUIZ_SUBMITTED: &str = "Quiz submitted successfully";
pub const MSG_RESULT_FETCHED: &str = "Quiz result fetched successfully";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuizPayload {
    #[validate(custom(function = validate_not_blank))]
    pub exam: String,
    #[validate(custom(function = validate_not_blank))]
    pub subject: String,
    #[validate(custom(function = validate_not_blank))]
    pub topic: String,
    #[validate(custom(function = validate_difficulty))]
    pub difficulty: String,
    #[validate(range(min = 1, max = 50, message = "num_questions must be a number between 1 and 50"))]
    pub num_questions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuizResponse {
    pub quiz_id: Uuid,
    pub exam: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub total_questions: usize,
    pub ai_generated: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerPayload {
    pub question_id: Uuid,
    #[serde(default)]
    pub selected_option: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitQuizPayload {
    pub answers: Vec<AnswerPayload>,
}

/// One graded-to-be answer as the core sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub selected_option: Option<OptionLabel>,
}

impl TryFrom<AnswerPayload> for SubmittedAnswer {
    type Error = crate::error::Error;

    fn try_from(payload: AnswerPayload) -> crate::error::Result<Self> {
        let selected_option = match payload.selected_option.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse().map_err(crate::error::Error::BadRequest)?),
        };
        Ok(Self {
            question_id: payload.question_id,
            selected_option,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: Uuid,
    pub exam: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub total_questions: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            exam: quiz.exam.clone(),
            subject: quiz.subject.clone(),
            topic: quiz.topic.clone(),
            difficulty: quiz.difficulty,
            total_questions: quiz.total_questions,
            created_at: quiz.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentedOption {
    pub key: OptionLabel,
    pub value: String,
}

/// A question as a quiz taker sees it: no correct option, no explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentableQuestion {
    pub id: Uuid,
    pub position: i32,
    pub exam: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_text: String,
    pub source: QuestionSource,
    pub options: Vec<PresentedOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentedQuiz {
    pub quiz: QuizSummary,
    pub questions: Vec<PresentableQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: Uuid,
    pub position: i32,
    pub selected_option: Option<OptionLabel>,
    pub correct_option: OptionLabel,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub quiz_id: Uuid,
    pub total_questions: i32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub unanswered: u32,
    pub score_percentage: u32,
    pub results: Vec<QuestionResult>,
}

/// `{ success, message, data }` wrapper used by every quiz endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}
