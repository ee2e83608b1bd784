use actix_web::{body::BoxBody, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error as ThisError;

use crate::wall::content::{ContentRejection, MAX_TEXT_LEN, MIN_TEXT_LEN};
use crate::wall::posts::CreateError;

/// Everything a handler can answer with besides a success. The `Display`
/// strings double as the user-facing copy, one distinct message per
/// denial reason so clients can render actionable guidance.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    #[error("The wall's datastore is not configured yet.")]
    NotConfigured,
    #[error("Minimum {MIN_TEXT_LEN} characters. Spill a little more.")]
    TextTooShort,
    #[error("Maximum {MAX_TEXT_LEN} characters. Trim it down a touch.")]
    TextTooLong,
    #[error("That phrase is on the wall's deny list. Reword it and try again.")]
    BlockedPhrase,
    #[error("Pick a color so the wall knows your vibe.")]
    MissingColor,
    #[error("Rate limit hit. Max 5 notes per hour. Try again soon.")]
    RateLimited,
    #[error("No copy/paste twins within 24 hours. Remix it and try again.")]
    DuplicateContent,
    #[error("That note is not on the wall.")]
    PostNotFound,
    #[error("Failed to load the wall.")]
    ListFailed,
    #[error("That didn't stick. Give it another slap?")]
    CreateFailed,
    #[error("The wall can't process that heart right now.")]
    HeartFailed,
    #[error("Unable to increment shares.")]
    ShareFailed,
    #[error("Could not send this report. Please try again later.")]
    ReportFailed,
}

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::TextTooShort | Self::TextTooLong | Self::BlockedPhrase | Self::MissingColor => {
                StatusCode::BAD_REQUEST
            }
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::DuplicateContent => StatusCode::CONFLICT,
            Self::PostNotFound => StatusCode::NOT_FOUND,
            Self::ListFailed
            | Self::CreateFailed
            | Self::HeartFailed
            | Self::ShareFailed
            | Self::ReportFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}

impl From<CreateError> for Error {
    fn from(value: CreateError) -> Self {
        match value {
            CreateError::Content(ContentRejection::TooShort) => Self::TextTooShort,
            CreateError::Content(ContentRejection::TooLong) => Self::TextTooLong,
            CreateError::Content(ContentRejection::BlockedPhrase) => Self::BlockedPhrase,
            CreateError::MissingColor => Self::MissingColor,
            CreateError::RateLimited => Self::RateLimited,
            CreateError::Duplicate => Self::DuplicateContent,
            CreateError::Store(report) => {
                tracing::error!(report = ?report, "Failed to insert post");
                Self::CreateFailed
            }
        }
    }
}

#[derive(Debug, ThisError)]
#[error("Failed to start the HTTP server")]
pub struct StartServerError;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(Error::NotConfigured.status_code(), 503);
        assert_eq!(Error::TextTooShort.status_code(), 400);
        assert_eq!(Error::MissingColor.status_code(), 400);
        assert_eq!(Error::RateLimited.status_code(), 429);
        assert_eq!(Error::DuplicateContent.status_code(), 409);
        assert_eq!(Error::PostNotFound.status_code(), 404);
        assert_eq!(Error::CreateFailed.status_code(), 500);
    }

    #[test]
    fn every_reason_has_distinct_copy() {
        let all = [
            Error::NotConfigured,
            Error::TextTooShort,
            Error::TextTooLong,
            Error::BlockedPhrase,
            Error::MissingColor,
            Error::RateLimited,
            Error::DuplicateContent,
            Error::PostNotFound,
            Error::ListFailed,
            Error::CreateFailed,
            Error::HeartFailed,
            Error::ShareFailed,
            Error::ReportFailed,
        ];

        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i + 1) {
                assert_ne!(a.to_string(), b.to_string());
            }
        }
    }
}
