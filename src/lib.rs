pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::database::store::QuizStore;
use crate::services::{
    ai_provider::{GeminiProvider, GenerativeModelProvider},
    question_generator::{GeneratorSettings, QuestionGenerator},
    question_pool::QuestionPool,
    quiz_assembler::QuizAssembler,
    quiz_grader::QuizGrader,
    quiz_presenter::QuizPresenter,
};

#[derive(Clone)]
pub struct AppState {
    pub question_pool: QuestionPool,
    pub quiz_assembler: QuizAssembler,
    pub quiz_presenter: QuizPresenter,
    pub quiz_grader: QuizGrader,
}

impl AppState {
    pub fn new(
        store: Arc<dyn QuizStore>,
        provider: Arc<dyn GenerativeModelProvider>,
        settings: GeneratorSettings,
    ) -> Self {
        let generator = QuestionGenerator::new(provider, settings);

        Self {
            question_pool: QuestionPool::new(store.clone()),
            quiz_assembler: QuizAssembler::new(store.clone(), generator),
            quiz_presenter: QuizPresenter::new(store.clone()),
            quiz_grader: QuizGrader::new(store),
        }
    }

    /// Wires the Gemini provider from the global configuration.
    pub fn from_config(store: Arc<dyn QuizStore>) -> error::Result<Self> {
        let config = config::get_config();
        let timeout = Duration::from_secs(config.ai_timeout_secs);
        let http_client = Client::builder().build()?;

        let provider = GeminiProvider::new(
            config.gemini_api_key.clone(),
            config.gemini_base_url.clone(),
            http_client,
            timeout,
        );
        let settings = GeneratorSettings {
            models: config.gemini_models.clone(),
            timeout,
            max_retries: config.ai_max_retries,
        };

        Ok(Self::new(store, Arc::new(provider), settings))
    }
}
