use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::{CategoryTuple, Difficulty};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub exam: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub total_questions: i32,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(category: &CategoryTuple, total_questions: usize, user_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            exam: category.exam.clone(),
            subject: category.subject.clone(),
            topic: category.topic.clone(),
            difficulty: category.difficulty,
            total_questions: total_questions as i32,
            created_at: Utc::now(),
        }
    }
}

/// Ordered link between a quiz and one of its questions. `position` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizMembership {
    pub quiz_id: Uuid,
    pub question_id: Uuid,
    pub position: i32,
}
