//! JSON envelope around [`CoreService`]: one request in, one
//! `{"status": "ok" | "err", ...}` document out.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ConfigError;
use crate::contract::{CoreRequest, CoreResponse};
use crate::core_service::{CoreService, ServiceError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    Config,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ErrorResponse {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::InvalidRequest(message)
            | ServiceError::Config(ConfigError::Invalid(message)) => {
                Self::new(ErrorCode::InvalidRequest, message)
            }
            ServiceError::Config(other) => Self::new(ErrorCode::Config, other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CoreResponse },
    Err { error: ErrorResponse },
}

impl From<Result<CoreResponse, ServiceError>> for TransportResponse {
    fn from(outcome: Result<CoreResponse, ServiceError>) -> Self {
        match outcome {
            Ok(response) => Self::Ok { response },
            Err(error) => {
                warn!(%error, "request failed");
                Self::Err {
                    error: error.into(),
                }
            }
        }
    }
}

pub fn handle_request(service: &CoreService, request: CoreRequest) -> TransportResponse {
    service.handle_command(request).into()
}

pub fn handle_json(service: &CoreService, payload: &str) -> String {
    let response = serde_json::from_str::<CoreRequest>(payload)
        .map(|request| handle_request(service, request))
        .unwrap_or_else(|error| {
            debug!(%error, "rejected malformed request");
            TransportResponse::Err {
                error: ErrorResponse::new(ErrorCode::InvalidJson, error.to_string()),
            }
        });
    encode(&response)
}

/// Serializes `value` for the wire, degrading to an `internal` error
/// document instead of panicking.
pub fn encode<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|error| {
        let fallback = TransportResponse::Err {
            error: ErrorResponse::new(
                ErrorCode::Internal,
                format!("failed to encode response: {error}"),
            ),
        };
        serde_json::to_string(&fallback).unwrap_or_default()
    })
}
