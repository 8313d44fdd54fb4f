use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::question::{CategoryTuple, OptionLabel, Question, QuestionSource};
use crate::services::ai_provider::{GenerativeModelProvider, ProviderError};

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Model variants tried in order, cheapest/fastest first.
    pub models: Vec<String>,
    /// Upper bound for a single variant call.
    pub timeout: Duration,
    /// How many times the whole variant sweep may run.
    pub max_retries: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            models: crate::config::DEFAULT_GEMINI_MODELS
                .split(',')
                .map(str::to_string)
                .collect(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Gemini API quota exceeded. Please try again later. ({0})")]
    QuotaExceeded(String),

    #[error("Invalid Gemini API key ({0})")]
    InvalidCredentials(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),

    #[error("Model provider error: {0}")]
    Provider(String),

    #[error("No model variants configured")]
    NoModels,
}

impl GenerationError {
    fn aborts_sweep(&self) -> bool {
        matches!(
            self,
            GenerationError::QuotaExceeded(_) | GenerationError::InvalidCredentials(_)
        )
    }

    fn aborts_retries(&self) -> bool {
        self.aborts_sweep() || matches!(self, GenerationError::ModelNotFound(_))
    }
}

impl From<GenerationError> for crate::error::Error {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::QuotaExceeded(_) => crate::error::Error::QuotaExceeded(err.to_string()),
            GenerationError::InvalidCredentials(_) => {
                crate::error::Error::InvalidCredentials(err.to_string())
            }
            other => crate::error::Error::GenerationFailed(other.to_string()),
        }
    }
}

enum VariantOutcome {
    Accepted(Vec<Question>),
    Failed(GenerationError),
    Abort(GenerationError),
}

/// Authors new questions through an external model. Never touches the pool;
/// the caller decides what to persist.
#[derive(Clone)]
pub struct QuestionGenerator {
    provider: Arc<dyn GenerativeModelProvider>,
    settings: GeneratorSettings,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn GenerativeModelProvider>, settings: GeneratorSettings) -> Self {
        Self { provider, settings }
    }

    pub async fn generate(
        &self,
        category: &CategoryTuple,
        count: usize,
    ) -> Result<Vec<Question>, GenerationError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let max_retries = self.settings.max_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=max_retries {
            tracing::info!(attempt, max_retries, %category, count, "AI generation attempt");
            match self.sweep(category, count).await {
                Ok(questions) => return Ok(questions),
                Err(e) if e.aborts_retries() => {
                    tracing::error!(error = %e, "AI generation failed fast");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "AI generation attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(GenerationError::NoModels))
    }

    async fn sweep(
        &self,
        category: &CategoryTuple,
        count: usize,
    ) -> Result<Vec<Question>, GenerationError> {
        let prompt = build_prompt(category, count);
        let mut last_error = None;

        for model in &self.settings.models {
            tracing::info!(model = %model, "Trying model");
            match self.try_variant(model, &prompt, category).await {
                VariantOutcome::Accepted(questions) => {
                    tracing::info!(model = %model, generated = questions.len(), "Generated questions");
                    return Ok(questions);
                }
                VariantOutcome::Abort(e) => return Err(e),
                VariantOutcome::Failed(e) => {
                    tracing::warn!(model = %model, error = %e, "Model failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(GenerationError::NoModels))
    }

    async fn try_variant(&self, model: &str, prompt: &str, category: &CategoryTuple) -> VariantOutcome {
        let call = self.provider.complete(prompt, model);
        let raw = match tokio::time::timeout(self.settings.timeout, call).await {
            Err(_) => return VariantOutcome::Failed(GenerationError::Timeout(self.settings.timeout)),
            Ok(Err(e)) => {
                return match e {
                    ProviderError::QuotaExceeded(m) => {
                        VariantOutcome::Abort(GenerationError::QuotaExceeded(m))
                    }
                    ProviderError::InvalidCredentials(m) => {
                        VariantOutcome::Abort(GenerationError::InvalidCredentials(m))
                    }
                    ProviderError::NotFound(m) => {
                        VariantOutcome::Failed(GenerationError::ModelNotFound(m))
                    }
                    ProviderError::Timeout(d) => VariantOutcome::Failed(GenerationError::Timeout(d)),
                    ProviderError::Transient(m) => VariantOutcome::Failed(GenerationError::Provider(m)),
                };
            }
            Ok(Ok(raw)) => raw,
        };

        match parse_generated(&raw, category) {
            Ok(questions) => VariantOutcome::Accepted(questions),
            Err(e) => VariantOutcome::Failed(e),
        }
    }
}

pub fn build_prompt(category: &CategoryTuple, count: usize) -> String {
    format!(
        r#"Generate {count} multiple choice questions for {exam} exam, subject: {subject}, topic: {topic}, difficulty: {difficulty}.

Requirements:
- Each question must have exactly 4 options (A, B, C, D)
- Only ONE correct answer per question
- Provide a brief explanation for the correct answer
- Return ONLY a valid JSON array, no markdown, no extra text
- Each question object must have: question_text, option_a, option_b, option_c, option_d, correct_option, explanation, difficulty

JSON format:
[
  {{
    "question_text": "",
    "option_a": "",
    "option_b": "",
    "option_c": "",
    "option_d": "",
    "correct_option": "A|B|C|D",
    "explanation": "",
    "difficulty": "{difficulty}"
  }}
]"#,
        count = count,
        exam = category.exam,
        subject = category.subject,
        topic = category.topic,
        difficulty = category.difficulty,
    )
}

/// The span from the first `[` to the last `]`; models like to wrap JSON in
/// prose or code fences.
fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end > start).then(|| &raw[start..=end])
}

#[derive(Debug, Deserialize)]
struct GeneratedRecord {
    #[serde(default)]
    question_text: Option<String>,
    #[serde(default)]
    option_a: Option<String>,
    #[serde(default)]
    option_b: Option<String>,
    #[serde(default)]
    option_c: Option<String>,
    #[serde(default)]
    option_d: Option<String>,
    #[serde(default)]
    correct_option: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
}

fn required(field: &str, value: Option<String>) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(format!("missing {}", field)),
    }
}

fn into_question(record: GeneratedRecord, category: &CategoryTuple) -> Result<Question, String> {
    let correct_option: OptionLabel = required("correct_option", record.correct_option)?.parse()?;
    // must be present; the requested category's value is what gets stored
    required("difficulty", record.difficulty)?;

    Ok(Question {
        id: Uuid::new_v4(),
        exam: category.exam.clone(),
        subject: category.subject.clone(),
        topic: category.topic.clone(),
        difficulty: category.difficulty,
        question_text: required("question_text", record.question_text)?,
        option_a: required("option_a", record.option_a)?,
        option_b: required("option_b", record.option_b)?,
        option_c: required("option_c", record.option_c)?,
        option_d: required("option_d", record.option_d)?,
        correct_option,
        explanation: record.explanation.unwrap_or_default().trim().to_string(),
        source: QuestionSource::Ai,
        created_at: Utc::now(),
    })
}

/// Parses and validates a model reply. One malformed record rejects the
/// whole batch.
pub fn parse_generated(raw: &str, category: &CategoryTuple) -> Result<Vec<Question>, GenerationError> {
    let json = extract_json_array(raw)
        .ok_or_else(|| GenerationError::InvalidResponse("no JSON array found".to_string()))?;

    let records: Vec<GeneratedRecord> = serde_json::from_str(json)
        .map_err(|e| GenerationError::InvalidResponse(format!("invalid JSON: {}", e)))?;

    if records.is_empty() {
        return Err(GenerationError::InvalidResponse("empty question list".to_string()));
    }

    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            into_question(record, category)
                .map_err(|reason| GenerationError::InvalidResponse(format!("question {}: {}", idx + 1, reason)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;
    use crate::services::ai_provider::MockGenerativeModelProvider;
    use async_trait::async_trait;
    use serde_json::json;

    fn category() -> CategoryTuple {
        CategoryTuple::new("JEE", "Physics", "Optics", Difficulty::Medium)
    }

    fn valid_reply(n: usize) -> String {
        let items: Vec<_> = (0..n)
            .map(|i| {
                json!({
                    "question_text": format!("Question {}", i),
                    "option_a": "a", "option_b": "b", "option_c": "c", "option_d": "d",
                    "correct_option": "C",
                    "explanation": "because",
                    "difficulty": "EASY",
                    "source": "AI"
                })
            })
            .collect();
        serde_json::to_string(&items).unwrap()
    }

    fn settings(models: &[&str], max_retries: u32) -> GeneratorSettings {
        GeneratorSettings {
            models: models.iter().map(|m| m.to_string()).collect(),
            timeout: Duration::from_secs(5),
            max_retries,
        }
    }

    #[test]
    fn parses_fenced_reply_and_tags_provenance() {
        let raw = format!("Sure! Here you go:\n```json\n{}\n```", valid_reply(2));
        let questions = parse_generated(&raw, &category()).unwrap();
        assert_eq!(questions.len(), 2);
        for q in &questions {
            assert_eq!(q.source, QuestionSource::Ai);
            assert_eq!(q.correct_option, OptionLabel::C);
            // category comes from the request, not the model's echo
            assert_eq!(q.difficulty, Difficulty::Medium);
            assert_eq!(q.topic, "Optics");
        }
        assert_ne!(questions[0].id, questions[1].id);
    }

    #[test]
    fn one_bad_record_rejects_the_batch() {
        let raw = json!([
            {"question_text": "ok", "option_a": "a", "option_b": "b", "option_c": "c", "option_d": "d", "correct_option": "A", "difficulty": "MEDIUM"},
            {"question_text": "missing d", "option_a": "a", "option_b": "b", "option_c": "c", "correct_option": "B", "difficulty": "MEDIUM"}
        ])
        .to_string();
        assert!(matches!(
            parse_generated(&raw, &category()),
            Err(GenerationError::InvalidResponse(msg)) if msg.contains("option_d")
        ));

        let raw = json!([
            {"question_text": "q", "option_a": "a", "option_b": "b", "option_c": "c", "option_d": "d", "correct_option": "E", "difficulty": "MEDIUM"}
        ])
        .to_string();
        assert!(parse_generated(&raw, &category()).is_err());

        let raw = json!([
            {"question_text": "ok", "option_a": "a", "option_b": "b", "option_c": "c", "option_d": "d", "correct_option": "A", "difficulty": "MEDIUM"},
            {"question_text": "no level", "option_a": "a", "option_b": "b", "option_c": "c", "option_d": "d", "correct_option": "A", "explanation": "e"}
        ])
        .to_string();
        assert!(matches!(
            parse_generated(&raw, &category()),
            Err(GenerationError::InvalidResponse(msg)) if msg.contains("question 2") && msg.contains("difficulty")
        ));
    }

    #[test]
    fn non_json_and_empty_replies_are_rejected() {
        assert!(parse_generated("I cannot help with that", &category()).is_err());
        assert!(parse_generated("[]", &category()).is_err());
        assert!(parse_generated("[not json]", &category()).is_err());
    }

    #[test]
    fn prompt_names_category_and_count() {
        let prompt = build_prompt(&category(), 7);
        assert!(prompt.starts_with("Generate 7 multiple choice questions for JEE exam"));
        assert!(prompt.contains("topic: Optics"));
        assert!(prompt.contains("\"difficulty\": \"MEDIUM\""));
    }

    #[tokio::test]
    async fn falls_through_to_next_variant_on_bad_output() {
        let mut provider = MockGenerativeModelProvider::new();
        provider
            .expect_complete()
            .withf(|_, model| model.starts_with("cheap"))
            .times(1)
            .returning(|_, _| Ok("not json at all".to_string()));
        provider
            .expect_complete()
            .withf(|_, model| model.starts_with("better"))
            .times(1)
            .returning(|_, _| Ok(valid_reply(3)));

        let generator = QuestionGenerator::new(Arc::new(provider), settings(&["cheap", "better"], 2));
        let questions = generator.generate(&category(), 3).await.unwrap();
        assert_eq!(questions.len(), 3);
    }

    #[tokio::test]
    async fn quota_aborts_without_trying_other_variants_or_retrying() {
        let mut provider = MockGenerativeModelProvider::new();
        provider
            .expect_complete()
            .times(1)
            .returning(|_, _| Err(ProviderError::QuotaExceeded("429".to_string())));

        let generator = QuestionGenerator::new(Arc::new(provider), settings(&["a", "b", "c"], 3));
        let err = generator.generate(&category(), 2).await.unwrap_err();
        assert!(matches!(err, GenerationError::QuotaExceeded(_)));
        assert!(matches!(
            crate::error::Error::from(err),
            crate::error::Error::QuotaExceeded(_)
        ));
    }

    #[tokio::test]
    async fn bad_credentials_abort_immediately() {
        let mut provider = MockGenerativeModelProvider::new();
        provider
            .expect_complete()
            .times(1)
            .returning(|_, _| Err(ProviderError::InvalidCredentials("401".to_string())));

        let generator = QuestionGenerator::new(Arc::new(provider), settings(&["a", "b"], 2));
        let err = generator.generate(&category(), 2).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn transient_failures_exhaust_the_retry_budget() {
        let mut provider = MockGenerativeModelProvider::new();
        provider
            .expect_complete()
            .times(4)
            .returning(|_, _| Err(ProviderError::Transient("503".to_string())));

        let generator = QuestionGenerator::new(Arc::new(provider), settings(&["a", "b"], 2));
        let err = generator.generate(&category(), 2).await.unwrap_err();
        assert_eq!(err, GenerationError::Provider("503".to_string()));
        assert!(matches!(
            crate::error::Error::from(err),
            crate::error::Error::GenerationFailed(_)
        ));
    }

    #[tokio::test]
    async fn not_found_on_last_variant_skips_retries() {
        let mut provider = MockGenerativeModelProvider::new();
        provider
            .expect_complete()
            .times(2)
            .returning(|_, model| Err(ProviderError::NotFound(model.to_string())));

        let generator = QuestionGenerator::new(Arc::new(provider), settings(&["a", "b"], 3));
        let err = generator.generate(&category(), 1).await.unwrap_err();
        assert_eq!(err, GenerationError::ModelNotFound("b".to_string()));
    }

    struct StalledProvider;

    #[async_trait]
    impl GenerativeModelProvider for StalledProvider {
        async fn complete(&self, _prompt: &str, _model: &str) -> Result<String, ProviderError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(valid_reply(1))
        }
    }

    #[tokio::test]
    async fn slow_variant_times_out() {
        let generator = QuestionGenerator::new(
            Arc::new(StalledProvider),
            GeneratorSettings {
                models: vec!["slow".to_string()],
                timeout: Duration::from_millis(20),
                max_retries: 1,
            },
        );
        let err = generator.generate(&category(), 1).await.unwrap_err();
        assert_eq!(err, GenerationError::Timeout(Duration::from_millis(20)));
    }
}
