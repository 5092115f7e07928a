//! Request body extraction
//!
//! [`JsonBody`] wraps `axum::Json` so malformed bodies answer with the usual
//! `{code, message, details}` envelope instead of axum's plain-text rejection.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use super::{AppError, ErrorCode};

/// JSON request body with `AppError` rejections
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_error(&rejection)),
        }
    }
}

fn rejection_error(rejection: &JsonRejection) -> AppError {
    let reason = rejection.body_text();
    match rejection {
        JsonRejection::JsonDataError(_) => match missing_field(&reason) {
            Some(field) => AppError::with_message(
                ErrorCode::RequiredField,
                format!("Missing required field: {field}"),
            )
            .with_detail("field", field),
            None => AppError::with_message(ErrorCode::ValidationFailed, data_error_message(&reason))
                .with_detail("reason", reason),
        },
        JsonRejection::JsonSyntaxError(_) => {
            AppError::with_message(ErrorCode::InvalidFormat, "Request body is not valid JSON")
                .with_detail("reason", reason)
        }
        JsonRejection::MissingJsonContentType(_) => AppError::with_message(
            ErrorCode::InvalidFormat,
            "Expected Content-Type: application/json",
        ),
        _ => AppError::invalid_request(reason),
    }
}

/// serde reports "missing field `name` at line 1 column 9"
fn missing_field(reason: &str) -> Option<&str> {
    let rest = &reason[reason.find("missing field `")? + "missing field `".len()..];
    rest.split('`').next().filter(|f| !f.is_empty())
}

fn data_error_message(reason: &str) -> String {
    let detail = reason
        .strip_prefix("Failed to deserialize the JSON body into the target type: ")
        .unwrap_or(reason);
    format!("Invalid request body: {detail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Party {
        number_of_guests: i32,
    }

    async fn extract(content_type: Option<&str>, body: &str) -> Result<JsonBody<Party>, AppError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(http::header::CONTENT_TYPE, content_type);
        }
        let req = builder.body(Body::from(body.to_owned())).unwrap();
        JsonBody::<Party>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn test_valid_body() {
        let JsonBody(party) = extract(Some("application/json"), r#"{"numberOfGuests":4}"#)
            .await
            .unwrap();
        assert_eq!(party.number_of_guests, 4);
    }

    #[tokio::test]
    async fn test_missing_field_names_the_field() {
        let err = extract(Some("application/json"), "{}").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
        assert_eq!(err.details.unwrap()["field"], "numberOfGuests");
    }

    #[tokio::test]
    async fn test_wrong_type_and_bad_syntax() {
        let err = extract(Some("application/json"), r#"{"numberOfGuests":"four"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = extract(Some("application/json"), "{not json").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);

        let err = extract(None, r#"{"numberOfGuests":4}"#).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_missing_field_parsing() {
        assert_eq!(
            missing_field("missing field `email` at line 1 column 2"),
            Some("email")
        );
        assert_eq!(missing_field("invalid type: string"), None);
    }
}
