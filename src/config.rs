use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

pub const DEFAULT_GEMINI_MODELS: &str = "gemini-1.5-flash-8b,gemini-1.5-flash,gemini-1.5-pro";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: Option<String>,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    /// Model variants in order of preference, cheapest first.
    pub gemini_models: Vec<String>,
    pub ai_timeout_secs: u64,
    pub ai_max_retries: u32,
    pub seed_questions: bool,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            gemini_api_key: get_env("GEMINI_API_KEY")?,
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_models: parse_model_list(
                &env::var("GEMINI_MODELS").unwrap_or_else(|_| DEFAULT_GEMINI_MODELS.to_string()),
            )?,
            ai_timeout_secs: get_env_parse_or("AI_TIMEOUT_SECS", 30)?,
            ai_max_retries: get_env_parse_or("AI_MAX_RETRIES", 2)?,
            seed_questions: get_env_parse_or("SEED_QUESTIONS", false)?,
        })
    }
}

fn parse_model_list(raw: &str) -> Result<Vec<String>> {
    let models: Vec<String> = raw
        .split(',')
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
    if models.is_empty() {
        return Err(Error::Config(
            "GEMINI_MODELS must name at least one model".to_string(),
        ));
    }
    Ok(models)
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_list_keeps_preference_order() {
        let models = parse_model_list(" a , b,,c ").unwrap();
        assert_eq!(models, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_model_list_is_rejected() {
        assert!(matches!(parse_model_list(" , "), Err(Error::Config(_))));
    }
}
