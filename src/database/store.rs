use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::attempt::Attempt;
use crate::models::question::{CategoryTuple, Question};
use crate::models::quiz::{Quiz, QuizMembership};

/// Persistence contract for the quiz engine.
///
/// Four logical collections live behind it: questions (shared, read-only once
/// written), quizzes, quiz memberships and attempts (all scoped to one quiz).
/// Implementations must be safe for concurrent use without global locks beyond
/// what a single record write needs.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Up to `count` questions matching `category`, uniformly sampled without
    /// replacement. Returning fewer than `count` is not an error.
    async fn sample_questions(&self, category: &CategoryTuple, count: usize)
        -> Result<Vec<Question>>;

    /// Bulk lookup. Unknown ids are simply absent from the result.
    async fn find_questions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>>;

    /// Best-effort bulk insert: a record that fails is skipped, the rest are
    /// still written. Returns the records that were stored.
    async fn insert_questions(&self, questions: &[Question]) -> Result<Vec<Question>>;

    async fn count_questions(&self) -> Result<i64>;

    /// Writes the quiz and its full membership set as one unit; either both
    /// land or neither does.
    async fn create_quiz(&self, quiz: &Quiz, memberships: &[QuizMembership]) -> Result<()>;

    async fn find_quiz(&self, quiz_id: Uuid) -> Result<Option<Quiz>>;

    /// Memberships of a quiz sorted by ascending position.
    async fn find_memberships(&self, quiz_id: Uuid) -> Result<Vec<QuizMembership>>;

    /// Insert or overwrite the attempt keyed by (quiz_id, question_id).
    async fn upsert_attempt(&self, attempt: &Attempt) -> Result<Attempt>;

    async fn find_attempts(&self, quiz_id: Uuid) -> Result<Vec<Attempt>>;
}
