use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::contacts::{ContactImportError, ContactServiceError, StoreError};
use crate::workflows::distribution::DistributionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Store(StoreError),
    Import(ContactImportError),
    Distribution(DistributionError),
    Service(ContactServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Store(err) => write!(f, "storage error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Distribution(err) => write!(f, "distribution error: {}", err),
            AppError::Service(err) => write!(f, "contact service error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Distribution(err) => Some(err),
            AppError::Service(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Import(_)
            | AppError::Distribution(DistributionError::Planning(_))
            | AppError::Service(ContactServiceError::Intake(_)) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Store(_)
            | AppError::Distribution(_)
            | AppError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ContactImportError> for AppError {
    fn from(value: ContactImportError) -> Self {
        Self::Import(value)
    }
}

impl From<DistributionError> for AppError {
    fn from(value: DistributionError) -> Self {
        Self::Distribution(value)
    }
}

impl From<ContactServiceError> for AppError {
    fn from(value: ContactServiceError) -> Self {
        Self::Service(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::contacts::IntakeError;
    use crate::workflows::distribution::{ExecutionError, PlanningError};
    use crate::workflows::contacts::ContactId;

    #[test]
    fn planning_errors_map_to_bad_request() {
        let error = AppError::from(DistributionError::Planning(PlanningError::DuplicateContact(
            ContactId(4),
        )));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn execution_errors_map_to_server_error() {
        let error = AppError::from(DistributionError::Execution(ExecutionError {
            source: StoreError::Unavailable("database is locked".to_string()),
            failed_at: None,
            plan: Box::default(),
        }));
        assert!(error.to_string().contains("database is locked"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn intake_errors_map_to_bad_request() {
        let error = AppError::from(ContactServiceError::Intake(IntakeError::MissingPhone));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
