//! Input validation for poll and account fields

use tracing::warn;
use uuid::Uuid;

/// Question length bounds (after trimming)
const QUESTION_MIN: usize = 5;
const QUESTION_MAX: usize = 255;

/// Option label length bounds (after trimming)
const OPTION_MIN: usize = 1;
const OPTION_MAX: usize = 100;

/// A poll needs at least this many options
const MIN_OPTIONS: usize = 2;

const PASSWORD_MIN: usize = 6;
const NAME_MIN: usize = 2;

/// Field validators shared by every action.
///
/// Each validator checks one rule set and short-circuits on the first
/// violation, so callers surface a single human-readable message rather
/// than a validation report. Raw serde errors never reach a caller:
/// identifiers arrive as plain strings and are parsed here.
pub struct InputValidator;

impl InputValidator {
    /// Validate a poll question, returning the trimmed text.
    pub fn validate_question(raw: &str) -> Result<String, ValidationError> {
        let question = raw.trim();
        let length = question.chars().count();
        if !(QUESTION_MIN..=QUESTION_MAX).contains(&length) {
            warn!(length, "question length out of bounds");
            return Err(ValidationError::QuestionLength {
                min: QUESTION_MIN,
                max: QUESTION_MAX,
            });
        }
        Ok(question.to_string())
    }

    /// Validate a poll's option labels, returning the trimmed list.
    pub fn validate_options(raw: &[String]) -> Result<Vec<String>, ValidationError> {
        if raw.len() < MIN_OPTIONS {
            warn!(count = raw.len(), "not enough poll options");
            return Err(ValidationError::NotEnoughOptions { min: MIN_OPTIONS });
        }

        let mut options = Vec::with_capacity(raw.len());
        for label in raw {
            let label = label.trim();
            let length = label.chars().count();
            if !(OPTION_MIN..=OPTION_MAX).contains(&length) {
                warn!(length, "option label length out of bounds");
                return Err(ValidationError::OptionLength {
                    min: OPTION_MIN,
                    max: OPTION_MAX,
                });
            }
            options.push(label.to_string());
        }
        Ok(options)
    }

    /// Parse a caller-supplied identifier, naming the field on failure.
    pub fn validate_uuid(field: &'static str, raw: &str) -> Result<Uuid, ValidationError> {
        Uuid::parse_str(raw.trim()).map_err(|_| {
            warn!(field, "malformed identifier");
            ValidationError::InvalidId { field }
        })
    }

    /// Syntactic email check, returning the trimmed address.
    ///
    /// Deliverability is the backend's problem; this only rejects input
    /// that cannot be an address at all.
    pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
        let email = raw.trim();
        let mut parts = email.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();

        let shape_ok = !local.is_empty()
            && !domain.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !email.chars().any(char::is_whitespace)
            && email.matches('@').count() == 1;

        if !shape_ok {
            warn!("malformed email address");
            return Err(ValidationError::InvalidEmail);
        }
        Ok(email.to_string())
    }

    pub fn validate_password(raw: &str) -> Result<(), ValidationError> {
        if raw.chars().count() < PASSWORD_MIN {
            return Err(ValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(())
    }

    /// Validate a display name, returning the trimmed text.
    pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
        let name = raw.trim();
        if name.chars().count() < NAME_MIN {
            return Err(ValidationError::NameTooShort { min: NAME_MIN });
        }
        Ok(name.to_string())
    }
}

/// Validation errors
///
/// Display strings are shown to callers verbatim.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("question must be between {min} and {max} characters")]
    QuestionLength { min: usize, max: usize },

    #[error("each option must be between {min} and {max} characters")]
    OptionLength { min: usize, max: usize },

    #[error("a poll needs at least {min} options")]
    NotEnoughOptions { min: usize },

    #[error("invalid {field}")]
    InvalidId { field: &'static str },

    #[error("invalid email address")]
    InvalidEmail,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("name must be at least {min} characters")]
    NameTooShort { min: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_boundaries() {
        assert!(InputValidator::validate_question("abcd").is_err());
        assert!(InputValidator::validate_question("abcde").is_ok());
        assert!(InputValidator::validate_question(&"q".repeat(255)).is_ok());
        assert!(InputValidator::validate_question(&"q".repeat(256)).is_err());
    }

    #[test]
    fn question_is_trimmed_before_the_length_check() {
        // five spaces around four characters is still too short
        assert!(InputValidator::validate_question("  abcd  ").is_err());
        assert_eq!(
            InputValidator::validate_question("  what now?  ").unwrap(),
            "what now?"
        );
    }

    #[test]
    fn option_count_boundary() {
        let one = vec!["yes".to_string()];
        assert!(InputValidator::validate_options(&one).is_err());

        let two = vec!["yes".to_string(), "no".to_string()];
        assert_eq!(InputValidator::validate_options(&two).unwrap().len(), 2);
    }

    #[test]
    fn option_label_bounds() {
        let blank = vec!["yes".to_string(), "   ".to_string()];
        assert!(InputValidator::validate_options(&blank).is_err());

        let long = vec!["yes".to_string(), "x".repeat(101)];
        assert!(InputValidator::validate_options(&long).is_err());
    }

    #[test]
    fn uuid_parsing() {
        assert!(InputValidator::validate_uuid("poll id", "not-a-uuid").is_err());
        assert!(
            InputValidator::validate_uuid("poll id", "8c7f0aac-97c4-4a2f-b756-a3d7c9f2e8e5")
                .is_ok()
        );
    }

    #[test]
    fn email_shapes() {
        assert!(InputValidator::validate_email("alice@example.com").is_ok());
        assert!(InputValidator::validate_email(" alice@example.com ").is_ok());
        assert!(InputValidator::validate_email("alice").is_err());
        assert!(InputValidator::validate_email("alice@").is_err());
        assert!(InputValidator::validate_email("@example.com").is_err());
        assert!(InputValidator::validate_email("alice@nodot").is_err());
        assert!(InputValidator::validate_email("a lice@example.com").is_err());
        assert!(InputValidator::validate_email("alice@@example.com").is_err());
    }

    #[test]
    fn password_minimum() {
        assert!(InputValidator::validate_password("12345").is_err());
        assert!(InputValidator::validate_password("123456").is_ok());
    }

    #[test]
    fn name_minimum() {
        assert!(InputValidator::validate_name(" a ").is_err());
        assert_eq!(InputValidator::validate_name(" Al ").unwrap(), "Al");
    }
}
