use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::store::QuizStore;
use crate::error::{Error, Result};
use crate::models::attempt::Attempt;
use crate::models::question::{CategoryTuple, Question};
use crate::models::quiz::{Quiz, QuizMembership};
use crate::utils::random::sample_without_replacement;

#[derive(Default)]
struct State {
    questions: HashMap<Uuid, Question>,
    quizzes: HashMap<Uuid, Quiz>,
    memberships: HashMap<Uuid, Vec<QuizMembership>>,
    attempts: HashMap<(Uuid, Uuid), Attempt>,
}

/// In-process store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn attempt_count(&self, quiz_id: Uuid) -> usize {
        self.state
            .read()
            .await
            .attempts
            .keys()
            .filter(|(q, _)| *q == quiz_id)
            .count()
    }
}

fn check_question(q: &Question) -> std::result::Result<(), String> {
    if q.question_text.trim().is_empty() {
        return Err("question_text is empty".to_string());
    }
    for (label, text) in q.options() {
        if text.trim().is_empty() {
            return Err(format!("option {} is empty", label));
        }
    }
    Ok(())
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn sample_questions(
        &self,
        category: &CategoryTuple,
        count: usize,
    ) -> Result<Vec<Question>> {
        let state = self.state.read().await;
        let matching: Vec<Question> = state
            .questions
            .values()
            .filter(|q| q.matches(category))
            .cloned()
            .collect();
        Ok(sample_without_replacement(matching, count))
    }

    async fn find_questions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.questions.get(id).cloned())
            .collect())
    }

    async fn insert_questions(&self, questions: &[Question]) -> Result<Vec<Question>> {
        let mut state = self.state.write().await;
        let mut stored = Vec::with_capacity(questions.len());
        for q in questions {
            if state.questions.contains_key(&q.id) {
                tracing::warn!(question_id = %q.id, "Skipping question with duplicate id");
                continue;
            }
            if let Err(reason) = check_question(q) {
                tracing::warn!(question_id = %q.id, reason = %reason, "Skipping malformed question");
                continue;
            }
            state.questions.insert(q.id, q.clone());
            stored.push(q.clone());
        }
        Ok(stored)
    }

    async fn count_questions(&self) -> Result<i64> {
        Ok(self.state.read().await.questions.len() as i64)
    }

    async fn create_quiz(&self, quiz: &Quiz, memberships: &[QuizMembership]) -> Result<()> {
        let mut state = self.state.write().await;
        if state.quizzes.contains_key(&quiz.id) {
            return Err(Error::Internal(format!("Quiz {} already exists", quiz.id)));
        }

        let mut seen_questions = HashSet::new();
        let mut seen_positions = HashSet::new();
        for m in memberships {
            if m.quiz_id != quiz.id {
                return Err(Error::Internal("Membership belongs to another quiz".to_string()));
            }
            if !state.questions.contains_key(&m.question_id) {
                return Err(Error::Internal(format!(
                    "Membership references unknown question {}",
                    m.question_id
                )));
            }
            if !seen_questions.insert(m.question_id) || !seen_positions.insert(m.position) {
                return Err(Error::Internal("Duplicate quiz membership".to_string()));
            }
        }

        let mut ordered = memberships.to_vec();
        ordered.sort_by_key(|m| m.position);
        state.quizzes.insert(quiz.id, quiz.clone());
        state.memberships.insert(quiz.id, ordered);
        Ok(())
    }

    async fn find_quiz(&self, quiz_id: Uuid) -> Result<Option<Quiz>> {
        Ok(self.state.read().await.quizzes.get(&quiz_id).cloned())
    }

    async fn find_memberships(&self, quiz_id: Uuid) -> Result<Vec<QuizMembership>> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .get(&quiz_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_attempt(&self, attempt: &Attempt) -> Result<Attempt> {
        let mut state = self.state.write().await;
        state
            .attempts
            .insert((attempt.quiz_id, attempt.question_id), attempt.clone());
        Ok(attempt.clone())
    }

    async fn find_attempts(&self, quiz_id: Uuid) -> Result<Vec<Attempt>> {
        Ok(self
            .state
            .read()
            .await
            .attempts
            .values()
            .filter(|a| a.quiz_id == quiz_id)
            .cloned()
            .collect())
    }
}
