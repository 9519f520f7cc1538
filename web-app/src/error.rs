use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::{json, Json, Value},
    Request,
};
use shared::data::{QueryError, USAGE};
use thiserror::Error;

use crate::source::FetchError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    MissingParameter(#[from] QueryError),
    #[error("Failed to fetch data: {0}")]
    Fetch(#[from] FetchError),
    #[error("Could not serialize the vehicle record: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait ErrorResponder {
    fn response(&self) -> (Status, Value);
}

impl ErrorResponder for Error {
    fn response(&self) -> (Status, Value) {
        match self {
            Error::MissingParameter(_) => (
                Status::BadRequest,
                json!({ "error": self.to_string(), "usage": USAGE }),
            ),
            Error::Fetch(_) => (Status::NotFound, json!({ "error": self.to_string() })),
            Error::Serialization(_) => (
                Status::InternalServerError,
                json!({ "error": self.to_string() }),
            ),
        }
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let (status, body) = self.response();
        (status, Json(body)).respond_to(request)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn missing_parameter_is_bad_request_with_usage() {
        let (status, body) = Error::from(QueryError::Missing).response();
        assert_eq!(status, Status::BadRequest);
        assert_eq!(
            body,
            json!({ "error": "Missing rc parameter", "usage": "/api/vehicle-info?rc=DL01AB1234" })
        );
    }

    #[test]
    fn fetch_failure_is_not_found_with_reason_only() {
        let error = Error::from(FetchError::Status(StatusCode::SERVICE_UNAVAILABLE));
        let (status, body) = error.response();
        assert_eq!(status, Status::NotFound);
        assert_eq!(
            body,
            json!({ "error": "Failed to fetch data: upstream responded with 503 Service Unavailable" })
        );
    }
}
