use std::sync::Arc;

use uuid::Uuid;

use crate::database::store::QuizStore;
use crate::error::{Error, Result};
use crate::models::question::CategoryTuple;
use crate::models::quiz::{Quiz, QuizMembership};
use crate::services::question_generator::{GenerationError, QuestionGenerator};
use crate::services::question_pool::QuestionPool;
use crate::utils::random::sample_without_replacement;

#[derive(Debug, Clone)]
pub struct AssembledQuiz {
    pub quiz: Quiz,
    /// Selected questions in membership order (index 0 is position 1).
    pub question_ids: Vec<Uuid>,
    pub total_questions: usize,
    pub was_generated: bool,
    /// The pool came up short and generation was attempted.
    pub backfill_attempted: bool,
}

/// Builds quizzes from the pool, backfilling through the generator.
#[derive(Clone)]
pub struct QuizAssembler {
    store: Arc<dyn QuizStore>,
    pool: QuestionPool,
    generator: QuestionGenerator,
}

impl QuizAssembler {
    pub fn new(store: Arc<dyn QuizStore>, generator: QuestionGenerator) -> Self {
        Self {
            pool: QuestionPool::new(store.clone()),
            store,
            generator,
        }
    }

    pub async fn create_quiz(
        &self,
        category: &CategoryTuple,
        requested: usize,
        user_id: Option<Uuid>,
    ) -> Result<AssembledQuiz> {
        let mut working = self.pool.sample_random(category, requested).await?;
        let mut was_generated = false;
        let backfill_attempted = working.len() < requested;

        if backfill_attempted {
            let shortfall = requested - working.len();
            tracing::info!(
                %category,
                found = working.len(),
                requested,
                shortfall,
                "Insufficient questions in pool, generating via AI"
            );

            match self.generator.generate(category, shortfall).await {
                Ok(generated) => {
                    let stored = self.pool.insert_batch(&generated).await?;
                    if !stored.is_empty() {
                        tracing::info!(count = stored.len(), "Generated and saved questions");
                        was_generated = true;
                        working.extend(stored);
                    }
                }
                Err(
                    e @ (GenerationError::QuotaExceeded(_) | GenerationError::InvalidCredentials(_)),
                ) => {
                    tracing::error!(error = %e, "AI generation rejected by provider");
                    return Err(e.into());
                }
                Err(e) if working.is_empty() => {
                    tracing::error!(error = %e, "AI generation failed with an empty pool");
                    return Err(Error::GenerationFailed(format!(
                        "Failed to generate questions via AI: {}",
                        e
                    )));
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        available = working.len(),
                        "AI generation failed, continuing with available questions"
                    );
                }
            }
        }

        if working.is_empty() {
            return Err(Error::GenerationFailed(
                "No questions available for this category".to_string(),
            ));
        }

        if working.len() > requested {
            working = sample_without_replacement(working, requested);
        }

        let quiz = Quiz::new(category, working.len(), user_id);
        let memberships: Vec<QuizMembership> = working
            .iter()
            .enumerate()
            .map(|(idx, q)| QuizMembership {
                quiz_id: quiz.id,
                question_id: q.id,
                position: (idx as i32) + 1,
            })
            .collect();

        self.store.create_quiz(&quiz, &memberships).await?;
        tracing::info!(quiz_id = %quiz.id, total = working.len(), was_generated, "Quiz created");

        Ok(AssembledQuiz {
            total_questions: working.len(),
            question_ids: working.iter().map(|q| q.id).collect(),
            quiz,
            was_generated,
            backfill_attempted,
        })
    }
}
