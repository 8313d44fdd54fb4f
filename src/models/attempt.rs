use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::OptionLabel;

/// Graded answer to one question of one quiz. Unique per (quiz_id, question_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub quiz_id: Uuid,
    pub question_id: Uuid,
    pub selected_option: Option<OptionLabel>,
    pub is_correct: bool,
    pub updated_at: DateTime<Utc>,
}
