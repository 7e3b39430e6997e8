use thiserror::Error;

use crate::{catalog::CatalogError, orientation::OrientationError};

/// Failure of a launcher action.
///
/// `Validation` is raised locally before any request is sent, `Request` covers
/// remote failures and timeouts, and `Poll` is a background status failure
/// that is never shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LauncherError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Request(String),
    #[error("status poll failed: {0}")]
    Poll(String),
}

impl LauncherError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    pub fn is_user_facing(&self) -> bool {
        !matches!(self, LauncherError::Poll(_))
    }
}

impl From<OrientationError> for LauncherError {
    fn from(value: OrientationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<CatalogError> for LauncherError {
    fn from(value: CatalogError) -> Self {
        Self::Validation(value.to_string())
    }
}
