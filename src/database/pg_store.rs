use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::store::QuizStore;
use crate::error::{Error, Result};
use crate::models::attempt::Attempt;
use crate::models::question::{CategoryTuple, Question};
use crate::models::quiz::{Quiz, QuizMembership};

const QUESTION_COLUMNS: &str = r#"
    id, exam, subject, topic, difficulty, question_text,
    option_a, option_b, option_c, option_d,
    correct_option, explanation, source, created_at
"#;

#[derive(Debug, FromRow)]
struct QuestionRow {
    id: Uuid,
    exam: String,
    subject: String,
    topic: String,
    difficulty: String,
    question_text: String,
    option_a: String,
    option_b: String,
    option_c: String,
    option_d: String,
    correct_option: String,
    explanation: String,
    source: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = Error;

    fn try_from(row: QuestionRow) -> Result<Self> {
        Ok(Question {
            id: row.id,
            exam: row.exam,
            subject: row.subject,
            topic: row.topic,
            difficulty: row.difficulty.parse().map_err(Error::Internal)?,
            question_text: row.question_text,
            option_a: row.option_a,
            option_b: row.option_b,
            option_c: row.option_c,
            option_d: row.option_d,
            correct_option: row.correct_option.parse().map_err(Error::Internal)?,
            explanation: row.explanation,
            source: row.source.parse().map_err(Error::Internal)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct QuizRow {
    id: Uuid,
    user_id: Option<Uuid>,
    exam: String,
    subject: String,
    topic: String,
    difficulty: String,
    total_questions: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuizRow> for Quiz {
    type Error = Error;

    fn try_from(row: QuizRow) -> Result<Self> {
        Ok(Quiz {
            id: row.id,
            user_id: row.user_id,
            exam: row.exam,
            subject: row.subject,
            topic: row.topic,
            difficulty: row.difficulty.parse().map_err(Error::Internal)?,
            total_questions: row.total_questions,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    quiz_id: Uuid,
    question_id: Uuid,
    position: i32,
}

#[derive(Debug, FromRow)]
struct AttemptRow {
    quiz_id: Uuid,
    question_id: Uuid,
    selected_option: Option<String>,
    is_correct: bool,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AttemptRow> for Attempt {
    type Error = Error;

    fn try_from(row: AttemptRow) -> Result<Self> {
        let selected_option = match row.selected_option {
            Some(raw) => Some(raw.parse().map_err(Error::Internal)?),
            None => None,
        };
        Ok(Attempt {
            quiz_id: row.quiz_id,
            question_id: row.question_id,
            selected_option,
            is_correct: row.is_correct,
            updated_at: row.updated_at,
        })
    }
}

fn into_questions(rows: Vec<QuestionRow>) -> Result<Vec<Question>> {
    rows.into_iter().map(Question::try_from).collect()
}

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_question(&self, q: &Question) -> Result<Question> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            r#"
            INSERT INTO questions (
                id, exam, subject, topic, difficulty, question_text,
                option_a, option_b, option_c, option_d,
                correct_option, explanation, source, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        ))
        .bind(q.id)
        .bind(&q.exam)
        .bind(&q.subject)
        .bind(&q.topic)
        .bind(q.difficulty.as_str())
        .bind(&q.question_text)
        .bind(&q.option_a)
        .bind(&q.option_b)
        .bind(&q.option_c)
        .bind(&q.option_d)
        .bind(q.correct_option.as_str())
        .bind(&q.explanation)
        .bind(q.source.as_str())
        .bind(q.created_at)
        .fetch_one(&self.pool)
        .await?;

        Question::try_from(row)
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn sample_questions(
        &self,
        category: &CategoryTuple,
        count: usize,
    ) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            r#"
            SELECT {}
            FROM questions
            WHERE exam = $1 AND subject = $2 AND topic = $3 AND difficulty = $4
            ORDER BY RANDOM()
            LIMIT $5
            "#,
            QUESTION_COLUMNS
        ))
        .bind(&category.exam)
        .bind(&category.subject)
        .bind(&category.topic)
        .bind(category.difficulty.as_str())
        .bind(count as i64)
        .fetch_all(&self.pool)
        .await?;

        into_questions(rows)
    }

    async fn find_questions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM questions WHERE id = ANY($1)",
            QUESTION_COLUMNS
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        into_questions(rows)
    }

    async fn insert_questions(&self, questions: &[Question]) -> Result<Vec<Question>> {
        let mut stored = Vec::with_capacity(questions.len());
        for q in questions {
            match self.insert_question(q).await {
                Ok(saved) => stored.push(saved),
                Err(e) => {
                    tracing::warn!(question_id = %q.id, error = ?e, "Skipping question that failed to insert");
                }
            }
        }
        Ok(stored)
    }

    async fn count_questions(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_quiz(&self, quiz: &Quiz, memberships: &[QuizMembership]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quizzes (id, user_id, exam, subject, topic, difficulty, total_questions, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(quiz.id)
        .bind(quiz.user_id)
        .bind(&quiz.exam)
        .bind(&quiz.subject)
        .bind(&quiz.topic)
        .bind(quiz.difficulty.as_str())
        .bind(quiz.total_questions)
        .bind(quiz.created_at)
        .execute(&mut *tx)
        .await?;

        if !memberships.is_empty() {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO quiz_questions (quiz_id, question_id, position) ",
            );
            builder.push_values(memberships, |mut row, m| {
                row.push_bind(m.quiz_id)
                    .push_bind(m.question_id)
                    .push_bind(m.position);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_quiz(&self, quiz_id: Uuid) -> Result<Option<Quiz>> {
        let row = sqlx::query_as::<_, QuizRow>(
            r#"
            SELECT id, user_id, exam, subject, topic, difficulty, total_questions, created_at
            FROM quizzes
            WHERE id = $1
            "#,
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Quiz::try_from).transpose()
    }

    async fn find_memberships(&self, quiz_id: Uuid) -> Result<Vec<QuizMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT quiz_id, question_id, position
            FROM quiz_questions
            WHERE quiz_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| QuizMembership {
                quiz_id: r.quiz_id,
                question_id: r.question_id,
                position: r.position,
            })
            .collect())
    }

    async fn upsert_attempt(&self, attempt: &Attempt) -> Result<Attempt> {
        let row = sqlx::query_as::<_, AttemptRow>(
            r#"
            INSERT INTO quiz_attempts (quiz_id, question_id, selected_option, is_correct, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (quiz_id, question_id) DO UPDATE SET
                selected_option = EXCLUDED.selected_option,
                is_correct = EXCLUDED.is_correct,
                updated_at = EXCLUDED.updated_at
            RETURNING quiz_id, question_id, selected_option, is_correct, updated_at
            "#,
        )
        .bind(attempt.quiz_id)
        .bind(attempt.question_id)
        .bind(attempt.selected_option.map(|o| o.as_str()))
        .bind(attempt.is_correct)
        .bind(attempt.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Attempt::try_from(row)
    }

    async fn find_attempts(&self, quiz_id: Uuid) -> Result<Vec<Attempt>> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT quiz_id, question_id, selected_option, is_correct, updated_at
            FROM quiz_attempts
            WHERE quiz_id = $1
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Attempt::try_from).collect()
    }
}
