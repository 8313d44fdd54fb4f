use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{Error, Result};
use crate::models::question::Difficulty;

pub fn validate<T: Validate>(val: &T) -> std::result::Result<(), validator::ValidationErrors> {
    val.validate()
}

pub fn parse_quiz_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::BadRequest("Invalid Quiz ID format".to_string()))
}

pub fn validate_difficulty(value: &str) -> std::result::Result<(), ValidationError> {
    value.parse::<Difficulty>().map(|_| ()).map_err(|msg| {
        let mut err = ValidationError::new("invalid_difficulty");
        err.message = Some(msg.into());
        err
    })
}

pub fn validate_not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_id_must_be_uuid() {
        assert!(parse_quiz_id("not-an-id").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_quiz_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn difficulty_is_checked_against_enum() {
        assert!(validate_difficulty("HARD").is_ok());
        assert!(validate_difficulty("hard").is_err());
        assert!(validate_difficulty("EXTREME").is_err());
    }
}
