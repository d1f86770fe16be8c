use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

/// Why a summary could not be produced. Callers can tell "the cluster has no
/// such objects" (an empty `Ok`) apart from any of these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("api error {code} ({reason}): {message}")]
    Api {
        code: u16,
        reason: String,
        message: String,
    },
    #[error("kubeconfig error: {0}")]
    Config(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("cluster call timed out after {0:?}")]
    Timeout(Duration),
    #[error("cluster {0:?} is not registered")]
    UnknownCluster(String),
    #[error("encoding error: {0}")]
    Encode(String),
}

impl FetchError {
    /// Short machine-readable label used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Api { .. } => "api",
            FetchError::Config(_) => "config",
            FetchError::Transport(_) => "transport",
            FetchError::Timeout(_) => "timeout",
            FetchError::UnknownCluster(_) => "unknown_cluster",
            FetchError::Encode(_) => "encode",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            FetchError::Api { code, .. } if (400..500).contains(code) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            FetchError::Api { .. } | FetchError::Transport(_) => StatusCode::BAD_GATEWAY,
            FetchError::Config(_) | FetchError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FetchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            FetchError::UnknownCluster(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<kube::Error> for FetchError {
    fn from(e: kube::Error) -> Self {
        match e {
            kube::Error::Api(resp) => FetchError::Api {
                code: resp.code,
                reason: resp.reason,
                message: resp.message,
            },
            kube::Error::InferConfig(e) => FetchError::Config(e.to_string()),
            kube::Error::Auth(e) => FetchError::Config(e.to_string()),
            other => FetchError::Transport(other.to_string()),
        }
    }
}

impl From<kube::config::KubeconfigError> for FetchError {
    fn from(e: kube::config::KubeconfigError) -> Self {
        FetchError::Config(e.to_string())
    }
}

impl From<serde_yaml::Error> for FetchError {
    fn from(e: serde_yaml::Error) -> Self {
        FetchError::Encode(e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
