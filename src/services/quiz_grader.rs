use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::store::QuizStore;
use crate::dto::quiz_dto::{QuestionResult, QuizResult, SubmittedAnswer};
use crate::error::{Error, Result};
use crate::models::attempt::Attempt;
use crate::models::question::{OptionLabel, Question};
use crate::models::quiz::{Quiz, QuizMembership};
use crate::services::question_pool::QuestionPool;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
}

impl Tally {
    fn record(&mut self, selected: Option<OptionLabel>, is_correct: bool) {
        match (selected, is_correct) {
            (_, true) => self.correct += 1,
            (Some(_), false) => self.incorrect += 1,
            (None, false) => self.unanswered += 1,
        }
    }
}

/// Scores answers against stored truth and keeps one attempt per question.
#[derive(Clone)]
pub struct QuizGrader {
    store: Arc<dyn QuizStore>,
    pool: QuestionPool,
}

impl QuizGrader {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self {
            pool: QuestionPool::new(store.clone()),
            store,
        }
    }

    /// Rounded percentage of correct answers among answered questions.
    pub fn score_percentage(correct: u32, incorrect: u32) -> u32 {
        let answered = correct + incorrect;
        if answered == 0 {
            return 0;
        }
        (100.0 * correct as f64 / answered as f64).round() as u32
    }

    async fn load(&self, quiz_id: Uuid) -> Result<(Quiz, Vec<QuizMembership>, HashMap<Uuid, Question>)> {
        let quiz = self
            .store
            .find_quiz(quiz_id)
            .await?
            .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))?;
        let memberships = self.store.find_memberships(quiz_id).await?;
        let ids: Vec<Uuid> = memberships.iter().map(|m| m.question_id).collect();
        let questions = self.pool.find_by_ids(&ids).await?;
        Ok((quiz, memberships, questions))
    }

    pub async fn submit(&self, quiz_id: Uuid, answers: &[SubmittedAnswer]) -> Result<QuizResult> {
        let (quiz, memberships, questions) = self.load(quiz_id).await?;

        // later entries for the same question replace earlier ones
        let mut graded: HashMap<Uuid, Attempt> = HashMap::new();
        for answer in answers {
            let Some(question) = questions.get(&answer.question_id) else {
                tracing::debug!(%quiz_id, question_id = %answer.question_id, "Skipping answer for question outside quiz");
                continue;
            };

            let attempt = Attempt {
                quiz_id,
                question_id: question.id,
                selected_option: answer.selected_option,
                is_correct: question.is_correct(answer.selected_option),
                updated_at: Utc::now(),
            };
            let saved = self.store.upsert_attempt(&attempt).await?;
            graded.insert(saved.question_id, saved);
        }

        let result = build_result(&quiz, &memberships, &questions, &graded);
        tracing::info!(
            %quiz_id,
            correct = result.correct_answers,
            incorrect = result.incorrect_answers,
            unanswered = result.unanswered,
            score = result.score_percentage,
            "Quiz submitted"
        );
        Ok(result)
    }

    pub async fn get_result(&self, quiz_id: Uuid) -> Result<QuizResult> {
        let (quiz, memberships, questions) = self.load(quiz_id).await?;
        let attempts: HashMap<Uuid, Attempt> = self
            .store
            .find_attempts(quiz_id)
            .await?
            .into_iter()
            .map(|a| (a.question_id, a))
            .collect();

        let mut result = build_result(&quiz, &memberships, &questions, &attempts);
        // questions never submitted count as unanswered too
        let total = u32::try_from(quiz.total_questions).unwrap_or(0);
        result.unanswered = total.saturating_sub(result.correct_answers + result.incorrect_answers);
        Ok(result)
    }
}

fn build_result(
    quiz: &Quiz,
    memberships: &[QuizMembership],
    questions: &HashMap<Uuid, Question>,
    attempts: &HashMap<Uuid, Attempt>,
) -> QuizResult {
    let mut tally = Tally::default();
    let mut results = Vec::with_capacity(attempts.len());

    for membership in memberships {
        let (Some(attempt), Some(question)) = (
            attempts.get(&membership.question_id),
            questions.get(&membership.question_id),
        ) else {
            continue;
        };
        tally.record(attempt.selected_option, attempt.is_correct);
        results.push(QuestionResult {
            question_id: question.id,
            position: membership.position,
            selected_option: attempt.selected_option,
            correct_option: question.correct_option,
            is_correct: attempt.is_correct,
            explanation: question.explanation.clone(),
        });
    }
    results.sort_by_key(|r| r.position);

    QuizResult {
        quiz_id: quiz.id,
        total_questions: quiz.total_questions,
        correct_answers: tally.correct,
        incorrect_answers: tally.incorrect,
        unanswered: tally.unanswered,
        score_percentage: QuizGrader::score_percentage(tally.correct, tally.incorrect),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_store::MemoryStore;
    use crate::models::question::{CategoryTuple, Difficulty};

    struct Fixture {
        store: Arc<MemoryStore>,
        grader: QuizGrader,
        quiz: Quiz,
        questions: Vec<Question>,
    }

    async fn fixture(n: usize) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let category = CategoryTuple::new("JEE", "Physics", "Mechanics", Difficulty::Easy);
        let questions: Vec<Question> = (0..n)
            .map(|i| {
                Question::curated(
                    &category,
                    &format!("Q{}", i),
                    ["a", "b", "c", "d"],
                    OptionLabel::A,
                    "A is right",
                )
            })
            .collect();
        let questions = store.insert_questions(&questions).await.unwrap();
        let quiz = Quiz::new(&category, n, None);
        let memberships: Vec<QuizMembership> = questions
            .iter()
            .enumerate()
            .map(|(i, q)| QuizMembership {
                quiz_id: quiz.id,
                question_id: q.id,
                position: i as i32 + 1,
            })
            .collect();
        store.create_quiz(&quiz, &memberships).await.unwrap();
        Fixture {
            grader: QuizGrader::new(store.clone()),
            store,
            quiz,
            questions,
        }
    }

    fn answer(q: &Question, selected: Option<OptionLabel>) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: q.id,
            selected_option: selected,
        }
    }

    #[test]
    fn score_percentage_rounds_and_handles_zero() {
        assert_eq!(QuizGrader::score_percentage(3, 1), 75);
        assert_eq!(QuizGrader::score_percentage(0, 0), 0);
        assert_eq!(QuizGrader::score_percentage(2, 1), 67);
        assert_eq!(QuizGrader::score_percentage(1, 2), 33);
    }

    #[tokio::test]
    async fn one_right_one_wrong_scores_fifty() {
        let f = fixture(2).await;
        let answers = vec![
            answer(&f.questions[0], Some(OptionLabel::A)),
            answer(&f.questions[1], Some(OptionLabel::C)),
        ];

        let result = f.grader.submit(f.quiz.id, &answers).await.unwrap();

        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.incorrect_answers, 1);
        assert_eq!(result.unanswered, 0);
        assert_eq!(result.score_percentage, 50);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.results[0].position, 1);
        assert_eq!(result.results[1].correct_option, OptionLabel::A);
        assert_eq!(result.results[1].explanation, "A is right");
    }

    #[tokio::test]
    async fn mixed_submission_counts_explicit_blanks_as_unanswered() {
        let f = fixture(5).await;
        let answers = vec![
            answer(&f.questions[0], Some(OptionLabel::A)),
            answer(&f.questions[1], Some(OptionLabel::A)),
            answer(&f.questions[2], Some(OptionLabel::A)),
            answer(&f.questions[3], Some(OptionLabel::B)),
            answer(&f.questions[4], None),
        ];

        let result = f.grader.submit(f.quiz.id, &answers).await.unwrap();

        assert_eq!(result.correct_answers, 3);
        assert_eq!(result.incorrect_answers, 1);
        assert_eq!(result.unanswered, 1);
        assert_eq!(result.score_percentage, 75);
    }

    #[tokio::test]
    async fn resubmission_replaces_previous_attempt() {
        let f = fixture(1).await;
        let q = &f.questions[0];

        f.grader
            .submit(f.quiz.id, &[answer(q, Some(OptionLabel::B))])
            .await
            .unwrap();
        let result = f
            .grader
            .submit(f.quiz.id, &[answer(q, Some(OptionLabel::A))])
            .await
            .unwrap();

        assert_eq!(result.correct_answers, 1);
        assert_eq!(f.store.attempt_count(f.quiz.id).await, 1);

        let stored = f.grader.get_result(f.quiz.id).await.unwrap();
        assert_eq!(stored.correct_answers, 1);
        assert_eq!(stored.results[0].selected_option, Some(OptionLabel::A));
    }

    #[tokio::test]
    async fn answers_outside_the_quiz_are_ignored() {
        let f = fixture(1).await;
        let stranger = SubmittedAnswer {
            question_id: Uuid::new_v4(),
            selected_option: Some(OptionLabel::A),
        };

        let result = f.grader.submit(f.quiz.id, &[stranger]).await.unwrap();

        assert_eq!(result.correct_answers, 0);
        assert!(result.results.is_empty());
        assert_eq!(f.store.attempt_count(f.quiz.id).await, 0);
    }

    #[tokio::test]
    async fn result_without_attempts_counts_everything_unanswered() {
        let f = fixture(3).await;

        let result = f.grader.get_result(f.quiz.id).await.unwrap();

        assert_eq!(result.correct_answers, 0);
        assert_eq!(result.incorrect_answers, 0);
        assert_eq!(result.score_percentage, 0);
        assert_eq!(result.unanswered, 3);
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn partial_submission_leaves_the_rest_unanswered_in_result() {
        let f = fixture(3).await;
        f.grader
            .submit(f.quiz.id, &[answer(&f.questions[1], Some(OptionLabel::D))])
            .await
            .unwrap();

        let result = f.grader.get_result(f.quiz.id).await.unwrap();

        assert_eq!(result.incorrect_answers, 1);
        assert_eq!(result.unanswered, 2);
        assert_eq!(result.results[0].position, 2);
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found() {
        let f = fixture(1).await;
        assert!(matches!(
            f.grader.submit(Uuid::new_v4(), &[]).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            f.grader.get_result(Uuid::new_v4()).await,
            Err(Error::NotFound(_))
        ));
    }
}
