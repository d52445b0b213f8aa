use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use seatwise_engine::{traits::StorageError, ErrorKind, ReservationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("No caller identity was provided. {0}")]
    Unauthenticated(String),
    #[error("Access denied. {0}")]
    Forbidden(String),
    #[error("{0}")]
    Reservation(#[from] ReservationError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Reservation(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::ResourceLocked => StatusCode::LOCKED,
                ErrorKind::Gateway => StatusCode::BAD_GATEWAY,
                ErrorKind::Backend => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<StorageError> for ServerError {
    fn from(e: StorageError) -> Self {
        Self::Reservation(ReservationError::from(e))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reservation_errors_map_to_status_codes() {
        let cases = [
            (ReservationError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ReservationError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ReservationError::Conflict("x".into()), StatusCode::CONFLICT),
            (ReservationError::ResourceLocked("x".into()), StatusCode::LOCKED),
            (ReservationError::Gateway("x".into()), StatusCode::BAD_GATEWAY),
            (ReservationError::DatabaseError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).status_code(), status);
        }
    }

    #[test]
    fn reservation_messages_pass_through() {
        let err = ServerError::from(ReservationError::Conflict("Seat ID 4 is reserved".into()));
        assert_eq!(err.to_string(), "Seat ID 4 is reserved");
    }
}
