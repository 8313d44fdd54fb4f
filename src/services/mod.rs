pub mod ai_provider;
pub mod question_generator;
pub mod question_pool;
pub mod quiz_assembler;
pub mod quiz_grader;
pub mod quiz_presenter;
