use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::database::store::QuizStore;
use crate::error::Result;
use crate::models::question::{CategoryTuple, Question};

/// Accessor over persisted questions.
#[derive(Clone)]
pub struct QuestionPool {
    store: Arc<dyn QuizStore>,
}

impl QuestionPool {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    /// Up to `count` random matches; fewer means the pool needs backfill.
    pub async fn sample_random(&self, category: &CategoryTuple, count: usize) -> Result<Vec<Question>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        self.store.sample_questions(category, count).await
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Question>> {
        let questions = self.store.find_questions_by_ids(ids).await?;
        Ok(questions.into_iter().map(|q| (q.id, q)).collect())
    }

    pub async fn insert_batch(&self, questions: &[Question]) -> Result<Vec<Question>> {
        if questions.is_empty() {
            return Ok(Vec::new());
        }
        let stored = self.store.insert_questions(questions).await?;
        if stored.len() < questions.len() {
            tracing::warn!(
                requested = questions.len(),
                stored = stored.len(),
                "Some questions were not persisted"
            );
        }
        Ok(stored)
    }

    /// Inserts the curated starter set when the pool is empty. Returns how many
    /// questions were added.
    pub async fn seed_defaults(&self) -> Result<usize> {
        if self.store.count_questions().await? > 0 {
            return Ok(0);
        }
        let stored = self
            .insert_batch(&crate::database::seed::default_questions())
            .await?;
        tracing::info!(count = stored.len(), "Seeded question pool");
        Ok(stored.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_store::MemoryStore;
    use crate::models::question::Difficulty;

    #[tokio::test]
    async fn seeding_is_a_no_op_on_a_populated_pool() {
        let pool = QuestionPool::new(Arc::new(MemoryStore::new()));
        assert_eq!(pool.seed_defaults().await.unwrap(), 10);
        assert_eq!(pool.seed_defaults().await.unwrap(), 0);

        let mechanics = CategoryTuple::new("JEE", "Physics", "Mechanics", Difficulty::Easy);
        let sample = pool.sample_random(&mechanics, 5).await.unwrap();
        assert_eq!(sample.len(), 2);
    }

    #[tokio::test]
    async fn find_by_ids_ignores_unknown_ids() {
        let pool = QuestionPool::new(Arc::new(MemoryStore::new()));
        pool.seed_defaults().await.unwrap();
        let calculus = CategoryTuple::new("JEE", "Mathematics", "Calculus", Difficulty::Easy);
        let known = pool.sample_random(&calculus, 1).await.unwrap();

        let missing = Uuid::new_v4();
        let found = pool.find_by_ids(&[known[0].id, missing]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&known[0].id));
        assert!(!found.contains_key(&missing));
    }
}
