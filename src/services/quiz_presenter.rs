use std::sync::Arc;

use uuid::Uuid;

use crate::database::store::QuizStore;
use crate::dto::quiz_dto::{PresentableQuestion, PresentedOption, PresentedQuiz, QuizSummary};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::services::question_pool::QuestionPool;
use crate::utils::random::shuffle;

#[derive(Clone)]
pub struct QuizPresenter {
    store: Arc<dyn QuizStore>,
    pool: QuestionPool,
}

impl QuizPresenter {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self {
            pool: QuestionPool::new(store.clone()),
            store,
        }
    }

    /// Read-only view of a quiz. Option order is reshuffled on every call.
    pub async fn present(&self, quiz_id: Uuid) -> Result<PresentedQuiz> {
        let quiz = self
            .store
            .find_quiz(quiz_id)
            .await?
            .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))?;

        let memberships = self.store.find_memberships(quiz_id).await?;
        let ids: Vec<Uuid> = memberships.iter().map(|m| m.question_id).collect();
        let questions = self.pool.find_by_ids(&ids).await?;

        let mut presented: Vec<PresentableQuestion> = memberships
            .iter()
            .filter_map(|m| match questions.get(&m.question_id) {
                Some(q) => Some(present_question(q, m.position)),
                None => {
                    tracing::warn!(%quiz_id, question_id = %m.question_id, "Quiz references a missing question");
                    None
                }
            })
            .collect();
        presented.sort_by_key(|q| q.position);

        Ok(PresentedQuiz {
            quiz: QuizSummary::from(&quiz),
            questions: presented,
        })
    }
}

fn present_question(question: &Question, position: i32) -> PresentableQuestion {
    let mut options: Vec<PresentedOption> = question
        .options()
        .into_iter()
        .map(|(key, value)| PresentedOption {
            key,
            value: value.to_string(),
        })
        .collect();
    shuffle(&mut options);

    PresentableQuestion {
        id: question.id,
        position,
        exam: question.exam.clone(),
        subject: question.subject.clone(),
        topic: question.topic.clone(),
        difficulty: question.difficulty,
        question_text: question.question_text.clone(),
        source: question.source,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_store::MemoryStore;
    use crate::models::question::{CategoryTuple, Difficulty, OptionLabel};
    use crate::models::quiz::{Quiz, QuizMembership};
    use std::collections::HashSet;

    async fn quiz_with_two_questions(store: &MemoryStore) -> (Quiz, Vec<Question>) {
        let category = CategoryTuple::new("JEE", "Physics", "Mechanics", Difficulty::Easy);
        let questions = vec![
            Question::curated(&category, "First", ["a1", "b1", "c1", "d1"], OptionLabel::B, "because b1"),
            Question::curated(&category, "Second", ["a2", "b2", "c2", "d2"], OptionLabel::C, "because c2"),
        ];
        let questions = store.insert_questions(&questions).await.unwrap();
        let quiz = Quiz::new(&category, 2, None);
        // stored out of order on purpose
        let memberships = vec![
            QuizMembership { quiz_id: quiz.id, question_id: questions[1].id, position: 2 },
            QuizMembership { quiz_id: quiz.id, question_id: questions[0].id, position: 1 },
        ];
        store.create_quiz(&quiz, &memberships).await.unwrap();
        (quiz, questions)
    }

    #[tokio::test]
    async fn presents_questions_in_position_order_without_answers() {
        let store = Arc::new(MemoryStore::new());
        let (quiz, questions) = quiz_with_two_questions(&store).await;

        let view = QuizPresenter::new(store.clone()).present(quiz.id).await.unwrap();

        assert_eq!(view.quiz.id, quiz.id);
        assert_eq!(view.questions.len(), 2);
        assert_eq!(view.questions[0].id, questions[0].id);
        assert_eq!(view.questions[0].position, 1);
        assert_eq!(view.questions[1].position, 2);

        let json = serde_json::to_value(&view).unwrap();
        let text = json.to_string();
        assert!(!text.contains("correct_option"));
        assert!(!text.contains("because"));
    }

    #[tokio::test]
    async fn options_keep_their_canonical_labels() {
        let store = Arc::new(MemoryStore::new());
        let (quiz, _) = quiz_with_two_questions(&store).await;
        let presenter = QuizPresenter::new(store.clone());

        for _ in 0..10 {
            let view = presenter.present(quiz.id).await.unwrap();
            let first = &view.questions[0];
            let mut keys: Vec<_> = first.options.iter().map(|o| o.key).collect();
            keys.sort();
            assert_eq!(keys, OptionLabel::ALL.to_vec());
            for option in &first.options {
                assert_eq!(option.value, format!("{}1", option.key.as_str().to_lowercase()));
            }
        }
    }

    #[tokio::test]
    async fn option_order_varies_between_presentations() {
        let store = Arc::new(MemoryStore::new());
        let (quiz, _) = quiz_with_two_questions(&store).await;
        let presenter = QuizPresenter::new(store.clone());

        let mut orders = HashSet::new();
        for _ in 0..50 {
            let view = presenter.present(quiz.id).await.unwrap();
            let keys: Vec<OptionLabel> = view.questions[0].options.iter().map(|o| o.key).collect();
            orders.insert(keys);
        }
        assert!(orders.len() >= 2, "option order never changed across 50 presentations");
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let err = QuizPresenter::new(store).present(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
