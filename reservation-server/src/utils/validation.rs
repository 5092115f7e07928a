//! Input validation helpers
//!
//! Text length limits shared by request DTOs, and the bridge from
//! `validator` derive errors to [`AppError`].

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::{AppError, AppResult};

/// Person names
pub const MAX_NAME_LEN: u64 = 200;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: u64 = 254;

/// Phone numbers and other short identifiers
pub const MAX_SHORT_TEXT_LEN: u64 = 100;

/// Descriptions and reasons
pub const MAX_NOTE_LEN: u64 = 500;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: u64 = 128;

/// Run the derived validation of a request body
pub fn validate_body<T: Validate>(body: &T) -> AppResult<()> {
    body.validate().map_err(into_app_error)
}

fn into_app_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<String> = errors
        .errors()
        .iter()
        .filter(|(_, kind)| matches!(kind, ValidationErrorsKind::Field(_)))
        .map(|(field, _)| field.to_string())
        .collect();
    fields.sort();

    let message = match fields.first() {
        Some(first) => format!("Invalid value for {first}"),
        None => "Invalid request body".to_string(),
    };
    AppError::validation(message).with_detail("fields", fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[derive(Validate)]
    struct Body {
        #[validate(length(min = 1, max = 5))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_valid_body_passes() {
        let body = Body {
            name: "Ann".into(),
            email: "ann@example.com".into(),
        };
        assert!(validate_body(&body).is_ok());
    }

    #[test]
    fn test_invalid_fields_are_listed() {
        let body = Body {
            name: "".into(),
            email: "nope".into(),
        };
        let err = validate_body(&body).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Invalid value for email");
        let fields = err.details.unwrap();
        assert_eq!(fields["fields"], serde_json::json!(["email", "name"]));
    }
}
